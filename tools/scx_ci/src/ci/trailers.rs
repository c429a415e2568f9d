// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use anyhow::Result;
use std::collections::BTreeSet;

use crate::git::{Git, COMMIT_SEPARATOR};
use crate::runner::CommandRunner;

pub const KERNEL_TRAILER: &str = "CI-Test-Kernel:";

/// Split `git log` output produced with [`COMMIT_SEPARATOR`] into the
/// individual, trimmed commit messages.
pub fn commit_messages(log_output: &str) -> Vec<&str> {
    log_output
        .split(COMMIT_SEPARATOR)
        .map(str::trim)
        .filter(|msg| !msg.is_empty())
        .collect()
}

/// CI-Test-Kernel values from the trailer block of a single commit message.
///
/// Lines are walked from the bottom up. Blank lines are skipped and the
/// first line without a colon ends the trailer block.
pub fn kernel_trailers(message: &str) -> Vec<String> {
    let mut kernels = Vec::new();

    for line in message.lines().rev() {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if !line.contains(':') {
            break;
        }

        if let Some(stripped) = line.strip_prefix(KERNEL_TRAILER) {
            kernels.push(stripped.trim().to_string());
        }
    }

    kernels
}

/// Get CI-Test-Kernel trailers from commits between HEAD and its merge base
/// with `origin/<base_ref>`, falling back to `origin/main`.
pub fn kernel_trailers_from_commits<R: CommandRunner + ?Sized>(
    runner: &R,
    base_ref: Option<&str>,
) -> Result<BTreeSet<String>> {
    let git = Git::new(runner);

    log::info!("GITHUB_BASE_REF: {:?}", base_ref);

    // PRs and the merge queue carry a target branch, pushes don't
    let base_ref = match base_ref.filter(|r| !r.is_empty()) {
        Some(base_ref) => {
            log::info!("Using merge-base with origin/{}", base_ref);
            base_ref
        }
        None => {
            log::info!("No GITHUB_BASE_REF found, using merge-base with origin/main");
            "main"
        }
    };

    let origin_base = format!("origin/{base_ref}");
    let merge_base = git.merge_base("HEAD", &origin_base)?;
    log::info!("Merge base with {}: {}", origin_base, merge_base);

    let log_range = format!("{merge_base}..HEAD");
    log::info!("Searching for trailers in commit range: {}", log_range);

    let output = git.log_messages(&log_range)?;

    let mut kernels = BTreeSet::new();
    if output.trim().is_empty() {
        return Ok(kernels);
    }

    let messages = commit_messages(&output);
    log::info!("Found {} commits to search", messages.len());

    for message in messages {
        let subject = message.lines().next().unwrap_or("Unknown commit");

        for kernel in kernel_trailers(message) {
            log::info!(
                "Found CI-Test-Kernel trailer '{}' in commit: {}",
                kernel,
                subject
            );
            kernels.insert(kernel);
        }
    }

    log::info!("Total kernels found from trailers: {:?}", kernels);

    Ok(kernels)
}
