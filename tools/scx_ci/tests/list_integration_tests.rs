// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use std::path::Path;
use std::process::{Command, Output};

use anyhow::{bail, Result};
use scx_ci::ci::matrix::MatrixEntry;
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_list-integration-tests");

fn has_git() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn isolated(cmd: &mut Command, dir: &Path) {
    cmd.current_dir(dir)
        .env("GIT_CEILING_DIRECTORIES", dir.parent().unwrap_or(dir))
        .env_remove("GITHUB_BASE_REF");
}

fn git(dir: &Path, args: &[&str]) -> Result<()> {
    let mut cmd = Command::new("git");
    isolated(&mut cmd, dir);
    let status = cmd
        .args([
            "-c",
            "user.name=Test User",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .status()?;
    if !status.success() {
        bail!("git {} failed", args.join(" "));
    }
    Ok(())
}

fn commit(dir: &Path, message: &str) -> Result<()> {
    git(dir, &["commit", "-q", "--allow-empty", "-m", message])
}

/// A repository where origin/main sits on the first commit and HEAD carries
/// `messages` on top of it.
fn create_test_repo(messages: &[&str]) -> Result<TempDir> {
    let dir = TempDir::new()?;
    git(dir.path(), &["init", "-q"])?;
    commit(dir.path(), "Initial commit")?;
    git(
        dir.path(),
        &["update-ref", "refs/remotes/origin/main", "HEAD"],
    )?;
    for message in messages {
        commit(dir.path(), message)?;
    }
    Ok(dir)
}

fn run(dir: &Path, args: &[&str]) -> Result<Output> {
    let mut cmd = Command::new(BIN);
    isolated(&mut cmd, dir);
    Ok(cmd.args(args).output()?)
}

fn parse_matrix(output: &Output) -> Result<Vec<MatrixEntry>> {
    let stdout = String::from_utf8(output.stdout.clone())?;
    let Some(json) = stdout.trim_end().strip_prefix("matrix=") else {
        bail!("missing matrix= prefix in {stdout:?}");
    };
    Ok(serde_json::from_str(json)?)
}

#[test]
fn test_usage_errors() -> Result<()> {
    let dir = TempDir::new()?;

    for args in [&[][..], &["stable/6_13", "extra"][..]] {
        let output = run(dir.path(), args)?;
        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
        assert!(!output.stderr.is_empty());
    }
    Ok(())
}

#[test]
fn test_no_trailers() -> Result<()> {
    if !has_git() {
        return Ok(());
    }
    let dir = create_test_repo(&["Second commit\n\nNo trailers here"])?;

    let output = run(dir.path(), &["stable/6_13"])?;
    assert!(output.status.success());

    let matrix = parse_matrix(&output)?;
    assert_eq!(matrix.len(), 12);
    assert!(matrix.iter().all(|e| e.kernel.is_empty()));
    Ok(())
}

#[test]
fn test_stack_with_multiple_trailers() -> Result<()> {
    if !has_git() {
        return Ok(());
    }
    let dir = create_test_repo(&[
        "First change\n\nCI-Test-Kernel: stable/6_12",
        "Second change\n\nCI-Test-Kernel: linux-6.11\nCI-Test-Kernel: stable/6_12",
        "Third change\n\nCI-Test-Kernel: linux-6.10\nnot a trailer",
    ])?;

    let mut cmd = Command::new(BIN);
    isolated(&mut cmd, dir.path());
    let output = cmd.env("GITHUB_BASE_REF", "main").arg("stable/6_13").output()?;
    assert!(output.status.success());

    let matrix = parse_matrix(&output)?;
    assert_eq!(matrix.len(), 12 + 12 + 11);
    assert_eq!(matrix.iter().filter(|e| e.kernel.is_empty()).count(), 12);
    assert_eq!(matrix.iter().filter(|e| e.kernel == "linux-6.11").count(), 12);
    assert_eq!(matrix.iter().filter(|e| e.kernel == "stable/6_12").count(), 11);
    assert!(matrix.iter().all(|e| e.kernel != "linux-6.10"));
    Ok(())
}

#[test]
fn test_missing_base_branch_propagates_git_status() -> Result<()> {
    if !has_git() {
        return Ok(());
    }
    let dir = create_test_repo(&[])?;

    let mut cmd = Command::new(BIN);
    isolated(&mut cmd, dir.path());
    let output = cmd.args(["--base-ref", "does-not-exist", "stable/6_13"]).output()?;

    let code = output.status.code().unwrap_or(0);
    assert_ne!(code, 0);
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn test_outside_repository_fails() -> Result<()> {
    if !has_git() {
        return Ok(());
    }
    let dir = TempDir::new()?;

    let output = run(dir.path(), &["stable/6_13"])?;
    assert_eq!(output.status.code(), Some(128));
    assert!(output.stdout.is_empty());
    Ok(())
}
