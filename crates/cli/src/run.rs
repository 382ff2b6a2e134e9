// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `migrctl run` / `migrctl version` — locate and launch `migrd`.
//!
//! Grounded on `oj`'s `daemon_process::find_ojd_binary` / `start_daemon_background`:
//! prefer an explicit override, then a sibling of the current executable,
//! then fall back to resolving `migrd` on `PATH`. Unlike `oj`, there is no
//! background/detached mode here — `migrd` owns its own signal handling
//! (spec §5/§6) and `migrctl run` simply waits on it in the foreground,
//! forwarding its exit status.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Stdio;

/// Launches `migrd` in the foreground and waits for it to exit, returning
/// its exit code (or 1 if it was terminated by a signal).
pub async fn run_foreground() -> Result<i32> {
    let binary = find_migrd_binary();
    let status = tokio::process::Command::new(&binary)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .with_context(|| format!("failed to launch migrd at '{}'", binary.display()))?;
    Ok(status.code().unwrap_or(1))
}

pub fn print_version() {
    println!("migrctl {}", env!("CARGO_PKG_VERSION"));
    match std::process::Command::new(find_migrd_binary()).arg("--version").output() {
        Ok(output) if output.status.success() => {
            print!("{}", String::from_utf8_lossy(&output.stdout));
        }
        _ => println!("migrd: not found (set MIGRD_BINARY or place it alongside migrctl)"),
    }
}

fn find_migrd_binary() -> PathBuf {
    if let Some(path) = crate::env::daemon_binary() {
        return PathBuf::from(path);
    }

    if let Ok(current_exe) = std::env::current_exe() {
        if let Some(dir) = current_exe.parent() {
            let sibling = dir.join("migrd");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    PathBuf::from("migrd")
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
