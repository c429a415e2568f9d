// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use anyhow::Context;
use std::io;
use std::process::Command;

/// Captured result of a finished external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external programs on behalf of the CI helpers.
///
/// Implementations block until the program exits and capture its output.
/// An `Err` means the program could not be started at all; a non-zero
/// exit is reported through [`CommandOutput::exit_code`].
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput>;
}

/// Spawns real processes in the current working directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        log::debug!("Running: {} {}", program, args.join(" "));

        let output = Command::new(program).args(args).output()?;

        Ok(CommandOutput {
            // Killed by a signal, no code to hand back.
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// An external command exited unsuccessfully.
///
/// Carried in the error chain so the binaries can recover the child's exit
/// status with `downcast_ref`.
pub struct CommandFailed {
    pub program: String,
    pub args: Vec<String>,
    pub exit_code: i32,
    pub stderr: String,
}

impl CommandFailed {
    /// Exit status to propagate from the calling process.
    pub fn exit_status(&self) -> i32 {
        if self.exit_code > 0 {
            self.exit_code
        } else {
            1
        }
    }
}

impl std::fmt::Display for CommandFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "`{} {}` exited with status {}",
            self.program,
            self.args.join(" "),
            self.exit_code
        )?;
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            write!(f, ": {stderr}")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for CommandFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// Run `program` and fail with [`CommandFailed`] on a non-zero exit.
pub fn run_checked<R: CommandRunner + ?Sized>(
    runner: &R,
    program: &str,
    args: &[&str],
) -> anyhow::Result<CommandOutput> {
    let output = runner
        .run(program, args)
        .with_context(|| format!("Failed to run {program}"))?;

    if !output.success() {
        return Err(anyhow::Error::msg(CommandFailed {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            exit_code: output.exit_code,
            stderr: output.stderr.clone(),
        }));
    }

    Ok(output)
}
