// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::git::Git;
use crate::runner::CommandRunner;

pub const KERNEL_VERSIONS_PATH: &str = ".github/workflows/kernel-versions.json";

/// The fields of a kernel-versions.json entry needed to refresh it. Anything
/// else in the entry is left as is.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KernelVersion {
    pub repo: String,
    pub branch: String,
    #[serde(default)]
    pub commit_hash: Option<String>,
}

/// Named kernel versions, in file order.
pub type KernelVersions = Map<String, Value>;

pub fn load_kernel_versions(path: &Path) -> Result<KernelVersions> {
    if !path.exists() {
        bail!(
            "{} not found. Are you running this from the root of the scx repo?",
            path.display()
        );
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Refresh the commit hash of every entry (or only the named `versions`)
/// from its upstream branch. Returns whether anything changed.
pub fn update_kernel_versions<R: CommandRunner + ?Sized>(
    runner: &R,
    data: &mut KernelVersions,
    versions: &[String],
    now: u64,
) -> Result<bool> {
    let git = Git::new(runner);
    let wanted: HashSet<&str> = versions.iter().map(String::as_str).collect();

    for name in versions {
        if !data.contains_key(name) {
            log::warn!("Unknown kernel version \"{}\", skipping", name);
        }
    }

    let mut diff = false;

    for (name, value) in data.iter_mut() {
        if !wanted.is_empty() && !wanted.contains(name.as_str()) {
            continue;
        }

        let version: KernelVersion = serde_json::from_value(value.clone())
            .with_context(|| format!("Invalid kernel version entry \"{name}\""))?;

        let new_hash = git.ls_remote_head(&version.repo, &version.branch)?;
        let old_hash = version.commit_hash.as_deref().unwrap_or("");
        if new_hash == old_hash {
            log::debug!("{} is up to date at {}", name, old_hash);
            continue;
        }

        log::info!("Updating {} from {} -> {}", name, old_hash, new_hash);

        let Some(entry) = value.as_object_mut() else {
            bail!("Kernel version entry \"{name}\" is not an object");
        };
        entry.insert("commitHash".to_string(), Value::from(new_hash));
        entry.insert("lastModified".to_string(), Value::from(now));

        diff = true;
    }

    Ok(diff)
}

pub fn update_kernels_command<R: CommandRunner + ?Sized>(
    runner: &R,
    path: &Path,
    versions: &[String],
    now: u64,
) -> Result<()> {
    let mut data = load_kernel_versions(path)?;

    if !update_kernel_versions(runner, &mut data, versions, now)? {
        log::info!("No changes made, exiting.");
        return Ok(());
    }

    let content =
        serde_json::to_string_pretty(&data).context("Failed to serialize kernel versions")?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}
