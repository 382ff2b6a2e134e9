// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! migrd — the migration pipeline's queue-driven daemon.
//!
//! Architecture (spec §4, §5):
//! - `Worker` × `concurrent_workers`: each owns a receive-decode-drive-ack
//!   loop against the same queue.
//! - `StepDriver`: drives the fixed four-step pipeline for one message.
//! - `TelemetryStore`: records per-process/per-step status.
//!
//! Grounded on `ojd::main`'s shape (flags before config load, `Config::load`,
//! `setup_logging`, signal-driven shutdown) with the WAL/checkpoint/listener
//! machinery dropped — this daemon has no local durable state of its own,
//! only what it reads from and writes back to the queue and telemetry store.

mod config;
mod error;
mod pipeline;
mod queue_service;
mod worker;

use std::collections::HashSet;
use std::sync::Arc;

use migr_adapters::{FakeAgentOrchestrator, FakeQueueClient};
use migr_codec::MessageCodec;
use migr_core::{SystemClock, UuidIdGen};
use migr_engine::StepDriver;
use migr_policy::{ClassifierConfig, RetryPolicy, RetryPolicyConfig};
use migr_storage::{InMemoryTelemetryStore, TelemetryStore};
use tracing::info;

use crate::config::Config;
use crate::queue_service::QueueService;
use crate::worker::Worker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("migrd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("migrd {}", env!("CARGO_PKG_VERSION"));
                println!("Queue-driven dispatcher for the migration pipeline");
                println!();
                println!("USAGE:");
                println!("    migrd");
                println!();
                println!("Configuration is read entirely from the environment; see spec §6");
                println!("(STORAGE_ACCOUNT_NAME, COSMOS_DB_ENDPOINT, and friends).");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: migrd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let _log_guard = setup_logging();

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "failed to start migrd");
            std::process::exit(err.exit_code());
        }
    };

    info!(
        concurrent_workers = config.concurrent_workers,
        queue_name = %config.queue_name,
        allow_retries = config.allow_retries,
        "starting migrd"
    );

    let config = Arc::new(config);
    let clock = SystemClock;
    let classifier_config = ClassifierConfig::default();
    let retry_policy = RetryPolicy::new(RetryPolicyConfig {
        max_attempts: config.max_retry_count,
        ..RetryPolicyConfig::default()
    });

    // Real Azure Storage Queue / Cosmos agent-orchestrator integrations are
    // out of scope (spec §1). These in-memory adapters implement the same
    // `QueueClient`/`AgentOrchestrator` seams a production backend would.
    let queue = FakeQueueClient::new();
    let orchestrator: Arc<dyn migr_adapters::AgentOrchestrator> = Arc::new(FakeAgentOrchestrator::new());
    let telemetry: Arc<dyn TelemetryStore> =
        Arc::new(InMemoryTelemetryStore::new(clock, HashSet::new(), HashSet::new()));

    let workers = (0..config.concurrent_workers)
        .map(|index| {
            let steps = pipeline::build_pipeline(
                Arc::clone(&orchestrator),
                classifier_config.clone(),
                clock,
                UuidIdGen,
            );
            let driver = Arc::new(StepDriver::new(Arc::clone(&telemetry), clock, UuidIdGen, steps));
            Worker::new(
                format!("worker-{index}"),
                queue.clone(),
                MessageCodec::new(clock),
                Arc::clone(&telemetry),
                driver,
                retry_policy.clone(),
                clock,
                Arc::clone(&config),
            )
        })
        .collect();

    let service = QueueService::new(workers, config.shutdown_grace_period);
    service.run().await?;

    info!("migrd stopped");
    Ok(())
}

fn setup_logging() -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    guard
}
