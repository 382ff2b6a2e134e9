// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure Collector (spec §4.8): builds a `StepFailureContext` from a raised
//! error, the step's timing state, and an environment snapshot. Correlation
//! id derivation grounded on `migr_core::id`'s `define_id!`/`IdGen`
//! newtype convention.

use migr_core::{Clock, ErrorKind, IdGen, StepFailureContext, StepState};
use std::collections::HashMap;

/// Severity bucket for a failure, per spec §4.8's heuristic override table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Classifies severity from the step phase and the underlying classification,
/// applying the heuristic override from spec §4.8: parameter validation and
/// authentication failures are always critical; timeouts are high;
/// YAML/parsing failures are medium; everything else defaults to low.
pub fn classify_severity(step_phase: &str, error_kind: ErrorKind, is_timeout: bool) -> Severity {
    let phase = step_phase.to_ascii_lowercase();
    if phase.contains("parameter_validation") || phase.contains("authentication") {
        return Severity::Critical;
    }
    if is_timeout {
        return Severity::High;
    }
    if phase.contains("yaml") || phase.contains("parsing") {
        return Severity::Medium;
    }
    match error_kind {
        ErrorKind::Poison => Severity::Critical,
        ErrorKind::NonRetryable => Severity::High,
        ErrorKind::Retryable => Severity::Medium,
        ErrorKind::Ignorable => Severity::Low,
    }
}

/// Builds `StepFailureContext` values for one step's failures, threading a
/// stable correlation id across that step's retried lifetime.
pub struct FailureCollector<C: Clock, I: IdGen> {
    clock: C,
    id_gen: I,
}

impl<C: Clock, I: IdGen> FailureCollector<C, I> {
    pub fn new(clock: C, id_gen: I) -> Self {
        Self { clock, id_gen }
    }

    /// Captures environment facts relevant to triage: runtime version,
    /// approximate memory pressure, and whether this looks like a
    /// containerized/region-pinned deployment.
    pub fn environment_snapshot() -> HashMap<String, String> {
        let mut snapshot = HashMap::new();
        snapshot.insert("runtime_version".to_string(), env!("CARGO_PKG_VERSION").to_string());
        snapshot.insert(
            "container".to_string(),
            std::env::var("CONTAINER").or_else(|_| std::env::var("KUBERNETES_SERVICE_HOST").map(|_| "true".to_string())).unwrap_or_else(|_| "false".to_string()),
        );
        if let Ok(region) = std::env::var("AZURE_REGION") {
            snapshot.insert("region".to_string(), region);
        }
        snapshot
    }

    #[allow(clippy::too_many_arguments)]
    pub fn collect(
        &self,
        step_name: &str,
        step_phase: impl Into<String>,
        error_kind: ErrorKind,
        message: impl Into<String>,
        exception_type: impl Into<String>,
        stack_trace: impl Into<String>,
        state: &StepState,
        files_attempted: Vec<String>,
        correlation_id: Option<String>,
    ) -> StepFailureContext {
        let execution_time_ms = state
            .execution_start
            .map(|start| self.clock.epoch_ms() - start)
            .unwrap_or(0)
            .max(0) as u64;

        StepFailureContext {
            step_name: step_name.to_string(),
            step_phase: step_phase.into(),
            error_kind,
            message: message.into(),
            exception_type: exception_type.into(),
            stack_trace: stack_trace.into(),
            captured_at: self.clock.now_iso8601(),
            execution_time_ms,
            files_attempted,
            system_context: Self::environment_snapshot(),
            correlation_id: Some(correlation_id.unwrap_or_else(|| self.id_gen.next())),
        }
    }
}

#[cfg(test)]
#[path = "failure_collector_tests.rs"]
mod tests;
