// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the Telemetry Store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no process document found for process_id {0}")]
    ProcessNotFound(String),
    #[error("no agent named {agent} tracked for process {process_id}")]
    AgentNotFound { process_id: String, agent: String },
    #[error("telemetry store concurrency semaphore closed unexpectedly")]
    ConcurrencyLimitClosed,
}
