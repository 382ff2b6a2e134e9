// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `StepState` and `StepFailureContext`: the shape each pipeline step produces.

use crate::classify::ErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tri-state result of a pipeline step, per the data model in spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepResult {
    #[default]
    NotStarted,
    Success,
    Failure,
}

/// Immutable record of a step failure, built by the Failure Collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepFailureContext {
    pub step_name: String,
    pub step_phase: String,
    pub error_kind: ErrorKind,
    pub message: String,
    pub exception_type: String,
    pub stack_trace: String,
    pub captured_at: String,
    pub execution_time_ms: u64,
    pub files_attempted: Vec<String>,
    pub system_context: HashMap<String, String>,
    pub correlation_id: Option<String>,
}

/// The shared shape every pipeline step produces. Timing fields are
/// milliseconds since the Unix epoch, set exclusively through the
/// `set_*` methods that mirror the step contract in spec §4.5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepState {
    pub name: String,
    pub result: StepResult,
    pub reason: String,
    pub requires_immediate_retry: bool,
    pub failure_context: Option<StepFailureContext>,

    pub execution_start: Option<i64>,
    pub execution_end: Option<i64>,
    pub orchestration_start: Option<i64>,
    pub orchestration_end: Option<i64>,
}

impl StepState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result: StepResult::NotStarted,
            reason: String::new(),
            requires_immediate_retry: false,
            failure_context: None,
            execution_start: None,
            execution_end: None,
            orchestration_start: None,
            orchestration_end: None,
        }
    }

    pub fn set_execution_start(&mut self, epoch_ms: i64) {
        self.execution_start = Some(epoch_ms);
    }

    pub fn set_orchestration_start(&mut self, epoch_ms: i64) {
        self.orchestration_start = Some(epoch_ms);
    }

    pub fn set_orchestration_end(&mut self, epoch_ms: i64) {
        self.orchestration_end = Some(epoch_ms);
    }

    pub fn set_execution_end(&mut self, epoch_ms: i64) {
        self.execution_end = Some(epoch_ms);
    }

    pub fn mark_success(&mut self, reason: impl Into<String>) {
        self.result = StepResult::Success;
        self.reason = reason.into();
        self.failure_context = None;
    }

    pub fn mark_failure(
        &mut self,
        reason: impl Into<String>,
        requires_immediate_retry: bool,
        failure_context: StepFailureContext,
    ) {
        self.result = StepResult::Failure;
        self.reason = reason.into();
        self.requires_immediate_retry = requires_immediate_retry;
        self.failure_context = Some(failure_context);
    }

    /// Time spent before orchestration began (step setup: validation, prep work).
    pub fn setup_duration_ms(&self) -> Option<i64> {
        Some(self.orchestration_start? - self.execution_start?)
    }

    /// Time spent awaiting the external orchestrator.
    pub fn orchestration_duration_ms(&self) -> Option<i64> {
        Some(self.orchestration_end? - self.orchestration_start?)
    }

    /// Total wall time for the step, from entry to return.
    pub fn total_duration_ms(&self) -> Option<i64> {
        Some(self.execution_end? - self.execution_start?)
    }

    /// True iff the four timing fields observe the ordering invariant in
    /// spec §8.7: `execution_start <= orchestration_start <= orchestration_end <= execution_end`.
    pub fn timings_well_ordered(&self) -> bool {
        match (
            self.execution_start,
            self.orchestration_start,
            self.orchestration_end,
            self.execution_end,
        ) {
            (Some(es), Some(os), Some(oe), Some(ee)) => es <= os && os <= oe && oe <= ee,
            _ => true,
        }
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
