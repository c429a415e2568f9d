// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! CI helpers for the sched_ext repository.
//!
//! `list-integration-tests` prints the integration test matrix, expanding
//! the default kernel and any `CI-Test-Kernel:` trailers found since the
//! merge base. `update-kernels` refreshes the pinned kernel commits in
//! `kernel-versions.json`.

use anyhow::Result;

pub mod ci;
pub mod git;
pub mod runner;

use runner::CommandFailed;

pub fn init_logging(verbose: bool) -> Result<()> {
    let loglevel = if verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let mut lcfg = simplelog::ConfigBuilder::new();
    lcfg.set_time_level(simplelog::LevelFilter::Error)
        .set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);
    simplelog::TermLogger::init(
        loglevel,
        lcfg.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

/// Process exit status for a failed command: a failing git keeps its own
/// status, everything else exits 1.
pub fn exit_status(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CommandFailed>()
        .map(CommandFailed::exit_status)
        .unwrap_or(1)
}
