// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `migrctl health` — validate that `migrd`'s required environment (spec
//! §6: `STORAGE_ACCOUNT_NAME`/`AZURE_STORAGE_CONNECTION_STRING`,
//! `COSMOS_DB_ENDPOINT`) is present, without starting the daemon.
//!
//! Grounded on `oj daemon --version`'s "ask without connecting" shape
//! (`commands::daemon::version`), reduced to a config-load probe since
//! `migrd` exposes no IPC surface to query over.

use anyhow::{bail, Result};
use migr_service::Config;

pub fn check() -> Result<()> {
    match Config::load() {
        Ok(config) => {
            println!("ok: configuration present");
            println!("  queue: {}", config.queue_name);
            println!("  dead_letter_queue: {}", config.dead_letter_queue_name);
            println!("  concurrent_workers: {}", config.concurrent_workers);
            Ok(())
        }
        Err(err) => bail!("unhealthy: {err}"),
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
