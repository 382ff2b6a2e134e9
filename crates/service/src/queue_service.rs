// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawns `concurrent_workers` receive loops and coordinates graceful
//! shutdown (spec §4.7/§5/§6). Grounded on `ojd::main`'s
//! `tokio::select!` over `SIGTERM`/`SIGINT` plus a `tokio::spawn`-per-task
//! fan-out, adapted from one listener task to a pool of identical worker
//! loops sharing a single `AtomicBool` run flag.

use crate::worker::Worker;
use migr_adapters::QueueClient;
use migr_core::{Clock, IdGen};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

/// Owns the worker pool and drives it until a shutdown signal arrives.
pub struct QueueService<Q: QueueClient, C: Clock, I: IdGen> {
    workers: Vec<Worker<Q, C, I>>,
    shutdown_grace_period: std::time::Duration,
}

impl<Q: QueueClient, C: Clock, I: IdGen> QueueService<Q, C, I> {
    pub fn new(workers: Vec<Worker<Q, C, I>>, shutdown_grace_period: std::time::Duration) -> Self {
        Self {
            workers,
            shutdown_grace_period,
        }
    }

    /// Runs every worker loop concurrently. Returns once `SIGTERM`/`SIGINT`
    /// is observed and every worker has drained (spec §6: shutdown grace
    /// period of `shutdown_grace_period`, default 2s). No new `receive`
    /// calls are issued after the signal (spec §4.7, testable property 10).
    pub async fn run(self) -> std::io::Result<()> {
        let running = Arc::new(AtomicBool::new(true));
        let mut handles = Vec::with_capacity(self.workers.len());
        for worker in self.workers {
            let running = Arc::clone(&running);
            handles.push(tokio::spawn(async move {
                worker.run(running).await;
            }));
        }

        wait_for_shutdown_signal().await?;
        info!("shutdown signal received, stopping worker loops");
        running.store(false, Ordering::Release);

        tokio::time::sleep(self.shutdown_grace_period).await;
        for handle in handles {
            let _ = handle.await;
        }
        info!("all worker loops stopped");
        Ok(())
    }
}

async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = sigint.recv() => info!("received SIGINT"),
    }
    Ok(())
}

#[cfg(test)]
#[path = "queue_service_tests.rs"]
mod tests;
