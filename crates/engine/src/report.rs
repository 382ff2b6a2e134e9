// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Report Model (spec §4.9): the sole structured output of a pipeline run,
//! consumed by out-of-scope renderers. `RemediationGuide`'s intent is
//! grounded on
//! `original_source/src/processor/src/libs/reporting/migration_report_generator.py`'s
//! severity-keyed guidance table, without carrying over its Markdown
//! rendering (out of scope per spec §1).

use crate::failure_collector::Severity;
use migr_core::{ErrorKind, StepFailureContext, StepResult, StepState};
use serde::{Deserialize, Serialize};

/// Per-step summary line in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDetail {
    pub step_name: String,
    pub result: StepResult,
    pub execution_time_ms: Option<i64>,
    pub files_processed: Vec<String>,
    pub files_failed: Vec<String>,
    pub failure_context: Option<StepFailureContext>,
    pub warnings: Vec<String>,
}

impl StepDetail {
    pub fn from_state(state: &StepState) -> Self {
        Self {
            step_name: state.name.clone(),
            result: state.result,
            execution_time_ms: state.total_duration_ms(),
            files_processed: Vec::new(),
            files_failed: state
                .failure_context
                .as_ref()
                .map(|ctx| ctx.files_attempted.clone())
                .unwrap_or_default(),
            failure_context: state.failure_context.clone(),
            warnings: Vec::new(),
        }
    }
}

/// Root-cause analysis across every step that ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureAnalysis {
    pub root_cause: Option<StepFailureContext>,
    pub contributing_factors: Vec<StepFailureContext>,
    pub recurrence_likelihood: RecurrenceLikelihood,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceLikelihood {
    Low,
    Medium,
    High,
}

impl RecurrenceLikelihood {
    /// Derived from the queue's retry count at the point the final report is
    /// built: a job that burned through several attempts before failing for
    /// good is more likely to fail again on a retry than one that failed
    /// outright.
    pub fn from_dequeue_count(dequeue_count: u32, max_attempts: u32) -> Self {
        if dequeue_count == 0 {
            RecurrenceLikelihood::Low
        } else if dequeue_count + 1 >= max_attempts {
            RecurrenceLikelihood::High
        } else {
            RecurrenceLikelihood::Medium
        }
    }
}

/// One remediation entry: a priority action template for a given failure kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationAction {
    pub priority: &'static str,
    pub action: &'static str,
}

/// Static lookup table mapping each `ErrorKind` to a remediation template.
pub fn remediation_for(kind: ErrorKind) -> RemediationAction {
    match kind {
        ErrorKind::Retryable => RemediationAction {
            priority: "low",
            action: "No action required; the queue will retry automatically with backoff.",
        },
        ErrorKind::NonRetryable => RemediationAction {
            priority: "high",
            action: "Inspect the failure reason and request payload; this job will not succeed on retry without a fix.",
        },
        ErrorKind::Poison => RemediationAction {
            priority: "high",
            action: "Inspect the raw queue payload; the message could not be decoded into a valid request.",
        },
        ErrorKind::Ignorable => RemediationAction {
            priority: "informational",
            action: "No action required; the step continued with reduced functionality.",
        },
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub completion_percent: f64,
    pub critical_issue_count: usize,
    pub recommendation_count: usize,
    pub total_execution_time_ms: i64,
}

/// The full report for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    pub process_id: String,
    pub steps: Vec<StepDetail>,
    pub failure_analysis: Option<FailureAnalysis>,
    pub executive_summary: ExecutiveSummary,
}

impl MigrationReport {
    /// Builds a report from a completed (successful or failed) pipeline run.
    /// `total_step_count` is the pipeline's full step count, used to compute
    /// `completion_percent` even when the run stopped early.
    pub fn build(
        process_id: impl Into<String>,
        states: &[StepState],
        total_step_count: usize,
        dequeue_count: u32,
        max_attempts: u32,
    ) -> Self {
        let steps: Vec<StepDetail> = states.iter().map(StepDetail::from_state).collect();

        let failure_contexts: Vec<StepFailureContext> = states
            .iter()
            .filter_map(|s| s.failure_context.clone())
            .collect();

        let failure_analysis = failure_contexts.split_first().map(|(root, rest)| FailureAnalysis {
            root_cause: Some(root.clone()),
            contributing_factors: rest.to_vec(),
            recurrence_likelihood: RecurrenceLikelihood::from_dequeue_count(dequeue_count, max_attempts),
        });

        let completed = states.iter().filter(|s| s.result == StepResult::Success).count();
        let completion_percent = if total_step_count == 0 {
            0.0
        } else {
            (completed as f64 / total_step_count as f64) * 100.0
        };

        let critical_issue_count = failure_contexts
            .iter()
            .filter(|ctx| {
                matches!(
                    crate::failure_collector::classify_severity(&ctx.step_phase, ctx.error_kind, ctx.step_phase.contains("timeout")),
                    Severity::Critical
                )
            })
            .count();

        let total_execution_time_ms = states.iter().filter_map(|s| s.total_duration_ms()).sum();

        Self {
            process_id: process_id.into(),
            steps,
            failure_analysis,
            executive_summary: ExecutiveSummary {
                completion_percent,
                critical_issue_count,
                recommendation_count: failure_contexts.len(),
                total_execution_time_ms,
            },
        }
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
