// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Schedulers tested once per kernel with no extra flags.
pub const SCHEDULERS: &[&str] = &[
    "scx_bpfland",
    "scx_chaos",
    "scx_lavd",
    "scx_rlfifo",
    "scx_rustland",
    "scx_rusty",
    "scx_tickless",
];

// p2dq fails on 6.12, see https://github.com/sched-ext/scx/issues/2075
const P2DQ: &str = "scx_p2dq";
const P2DQ_BROKEN_KERNEL: &str = "stable/6_12";

const LAYERED: &str = "scx_layered";
const LAYERED_TOPOLOGY_FLAGS: &[&str] = &["--disable-topology=false", "--disable-topology=true"];
const LAYERED_ANTISTALL_FLAGS: &[&str] = &["", "--disable-antistall"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixEntry {
    pub name: String,
    pub flags: String,
    pub kernel: String,
}

impl MatrixEntry {
    fn new(name: &str, flags: String, kernel: &str) -> Self {
        Self {
            name: name.to_string(),
            flags,
            kernel: kernel.to_string(),
        }
    }
}

fn join_flags(flags: &[&str]) -> String {
    flags
        .iter()
        .filter(|f| !f.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Expand every kernel into its matrix rows.
///
/// Kernels are visited in set order. Rows for `default_kernel` carry an
/// empty kernel name.
pub fn build_matrix(kernels: &BTreeSet<String>, default_kernel: &str) -> Vec<MatrixEntry> {
    let mut matrix = Vec::new();

    for kernel in kernels {
        // use a blank kernel name for the default, as the common case is to
        // have no trailers and it makes the matrix names harder to read.
        let kernel_name = if kernel == default_kernel {
            ""
        } else {
            kernel.as_str()
        };

        for scheduler in SCHEDULERS {
            matrix.push(MatrixEntry::new(scheduler, String::new(), kernel_name));
        }

        if kernel != P2DQ_BROKEN_KERNEL {
            matrix.push(MatrixEntry::new(P2DQ, String::new(), kernel_name));
        }

        for topology in LAYERED_TOPOLOGY_FLAGS {
            for antistall in LAYERED_ANTISTALL_FLAGS {
                let flags = join_flags(&[*topology, *antistall]);
                matrix.push(MatrixEntry::new(LAYERED, flags, kernel_name));
            }
        }
    }

    matrix
}

/// The `matrix=<json>` line consumed by the workflow's output capture.
pub fn render_matrix(matrix: &[MatrixEntry]) -> Result<String> {
    let json = serde_json::to_string(matrix).context("Failed to serialize matrix")?;
    Ok(format!("matrix={json}"))
}
