// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors from queue backend operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("update visibility failed: {0}")]
    UpdateVisibilityFailed(String),
    #[error("dead-letter send failed: {0}")]
    SendToDeadLetterFailed(String),
    /// The backend reports the pop receipt as stale (lease already expired
    /// or the message already handled by another worker). Per spec §4.7's
    /// delete semantics, callers treat this as equivalent to success rather
    /// than as an error.
    #[error("lease expired or receipt unknown for message {0}")]
    LeaseExpired(String),
}

/// Errors from the agent orchestrator seam (spec §1 "out of scope" boundary:
/// the LLM agents and their group-chat orchestration).
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{step}: timeout waiting for orchestrator response")]
    Timeout { step: String },
    #[error("{step}: orchestrator call failed: {message}")]
    CallFailed { step: String, message: String },
    #[error("{step}: agent reported hard termination: {reason}")]
    HardTermination { step: String, reason: String },
}
