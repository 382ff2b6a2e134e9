// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `StepOutcome`: the tagged enum a `Step` returns, richer than the
//! persisted `migr_core::StepState` tri-state. The driver translates one
//! into the other (spec §9 DESIGN NOTES: "concrete struct + tagged enum for
//! step results" instead of the original's string/dict-keyed categories).

use migr_core::StepFailureContext;
use serde_json::Value;

/// The four return categories a step contract implementation may produce,
/// per spec §4.5.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// `result = success`; `payload` carries the step's typed output fields,
    /// validated against `Step::required_success_fields` by the driver.
    Success { reason: String, payload: Value },

    /// Permanent failure: the driver aborts, the queue layer is forced to a
    /// non-retryable classification regardless of the underlying error.
    HardTermination {
        reason: String,
        failure_context: StepFailureContext,
    },

    /// Failure the step itself diagnosed as transient infrastructure trouble
    /// that a fresh lease would clear; `requires_immediate_retry` is always
    /// `true` for this variant.
    RetryableFailure {
        reason: String,
        failure_context: StepFailureContext,
    },

    /// Crash-class failure; the queue layer consults the Error Classifier on
    /// the underlying exception to decide requeue-backoff vs DLQ.
    CriticalFailure {
        reason: String,
        failure_context: StepFailureContext,
    },
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success { .. })
    }
}
