// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use clap::Parser;
use std::path::PathBuf;
use std::process::exit;
use std::time::{SystemTime, UNIX_EPOCH};

use scx_ci::ci::update_kernels::{update_kernels_command, KERNEL_VERSIONS_PATH};
use scx_ci::runner::ProcessRunner;

#[derive(Parser)]
#[command(name = "update-kernels")]
#[command(about = "Update kernel locks")]
struct Cli {
    #[arg(short = 'v', long = "verbose", help = "Verbose logging")]
    verbose: bool,

    #[arg(short = 'f', long = "file", default_value = KERNEL_VERSIONS_PATH)]
    file: PathBuf,

    /// Named version(s) to update (default=all)
    versions: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = scx_ci::init_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        exit(1);
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    if let Err(e) = update_kernels_command(&ProcessRunner, &cli.file, &cli.versions, now) {
        eprintln!("Failed to run command: {e:#}");
        exit(scx_ci::exit_status(&e));
    }
}
