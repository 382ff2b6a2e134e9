// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RetryDecision`: the Retry Policy's verdict for a failed attempt.

use serde::{Deserialize, Serialize};

/// The action the Queue Service must take for a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryAction {
    RequeueImmediate,
    RequeueBackoff,
    DeadLetter,
}

/// Produced by Retry Policy for a failed attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryDecision {
    pub action: RetryAction,
    /// 0 for immediate requeue, `delay_seconds` for backoff, unused for DLQ.
    pub visibility_timeout_seconds: u64,
    /// Informational; carried into telemetry even for `dead_letter` decisions (as 0).
    pub delay_seconds: u64,
    pub reason: String,
}

impl RetryDecision {
    pub fn requeue_immediate(reason: impl Into<String>) -> Self {
        Self {
            action: RetryAction::RequeueImmediate,
            visibility_timeout_seconds: 0,
            delay_seconds: 0,
            reason: reason.into(),
        }
    }

    pub fn requeue_backoff(delay_seconds: u64, reason: impl Into<String>) -> Self {
        Self {
            action: RetryAction::RequeueBackoff,
            visibility_timeout_seconds: delay_seconds,
            delay_seconds,
            reason: reason.into(),
        }
    }

    pub fn dead_letter(reason: impl Into<String>) -> Self {
        Self {
            action: RetryAction::DeadLetter,
            visibility_timeout_seconds: 0,
            delay_seconds: 0,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
