// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use anyhow::{bail, Context, Result};

use crate::runner::{run_checked, CommandRunner};

/// Appended after every commit body by [`Git::log_messages`].
pub const COMMIT_SEPARATOR: &str = "---ENDOFCOMMIT---";

/// The handful of git queries the CI helpers need.
pub struct Git<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
}

impl<'a, R: CommandRunner + ?Sized> Git<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        Ok(run_checked(self.runner, "git", args)?.stdout)
    }

    pub fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        let out = self
            .git(&["merge-base", a, b])
            .with_context(|| format!("Failed to find merge base of {a} and {b}"))?;
        Ok(out.trim().to_string())
    }

    /// Full message bodies of every commit in `range`, each followed by
    /// [`COMMIT_SEPARATOR`] on its own line.
    pub fn log_messages(&self, range: &str) -> Result<String> {
        let format = format!("--format=%B%n{COMMIT_SEPARATOR}");
        self.git(&["log", format.as_str(), range])
            .with_context(|| format!("Failed to read commit messages for {range}"))
    }

    /// Commit hash that `branch` points at in the remote `repo`.
    pub fn ls_remote_head(&self, repo: &str, branch: &str) -> Result<String> {
        let head = format!("heads/{branch}");
        let out = self
            .git(&["ls-remote", "--exit-code", repo, head.as_str()])
            .with_context(|| format!("Failed to query {head} of {repo}"))?;

        match out.split('\t').next().map(str::trim) {
            Some(hash) if !hash.is_empty() => Ok(hash.to_string()),
            _ => bail!("No hash for {head} in {repo}"),
        }
    }
}
