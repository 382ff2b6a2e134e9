// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step Driver (spec §4.6): drives a fixed linear pipeline of steps,
//! grounded on
//! `oj_engine::runtime::handlers::worker::{polling,dispatch,completion,lifecycle}`'s
//! control-flow shape (sequential handler methods on a shared struct,
//! telemetry calls interleaved with the side-effecting work).

use crate::error::EngineError;
use crate::failure_collector::FailureCollector;
use crate::outcome::StepOutcome;
use crate::step::{missing_required_fields, SharedStep, StepContext};
use migr_core::{Clock, ErrorKind, IdGen, StepFailureContext, StepResult, StepResultSummary, StepState};
use migr_storage::TelemetryStore;
use std::sync::Arc;

/// Outcome of driving the full pipeline for one job.
pub struct PipelineReport {
    /// Every step's terminal `StepState`, in execution order. Stops short of
    /// the full step list if the pipeline aborted early.
    pub step_states: Vec<StepState>,
    /// `true` iff every step reached `StepResult::Success`.
    pub succeeded: bool,
}

impl PipelineReport {
    /// The last step that ran — the one the Queue Service's retry decision
    /// is based on when `succeeded` is `false`.
    pub fn final_state(&self) -> Option<&StepState> {
        self.step_states.last()
    }
}

/// Drives `steps` sequentially against one job's `StepContext`. Does not
/// retry internally — spec §4.6: "Retry is exclusively a queue-level
/// concern, so that a retried job restarts from step 1 with a fresh lease."
pub struct StepDriver<C: Clock, I: IdGen> {
    telemetry: Arc<dyn TelemetryStore>,
    clock: C,
    failure_collector: FailureCollector<C, I>,
    steps: Vec<SharedStep>,
}

impl<C: Clock, I: IdGen> StepDriver<C, I> {
    pub fn new(telemetry: Arc<dyn TelemetryStore>, clock: C, id_gen: I, steps: Vec<SharedStep>) -> Self {
        let failure_collector = FailureCollector::new(clock.clone(), id_gen);
        Self {
            telemetry,
            clock,
            failure_collector,
            steps,
        }
    }

    pub async fn drive(&self, ctx: &mut StepContext) -> Result<PipelineReport, EngineError> {
        if self.steps.is_empty() {
            return Err(EngineError::EmptyPipeline);
        }

        let mut step_states = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            self.telemetry
                .transition_to_phase(&ctx.process_id, step.name(), step.name())
                .await?;

            let mut state = StepState::new(step.name());
            state.set_execution_start(self.clock.epoch_ms());
            let outcome = step.execute(ctx, &mut state).await;
            state.set_execution_end(self.clock.epoch_ms());

            let outcome = self.validate_success_payload(step.as_ref(), outcome, &state);
            self.apply_outcome(&mut state, outcome, ctx);

            let succeeded = state.result == StepResult::Success;
            self.telemetry
                .record_step_result(
                    &ctx.process_id,
                    step.name(),
                    StepResultSummary {
                        step_name: step.name().to_string(),
                        succeeded,
                        reason: state.reason.clone(),
                        total_duration_ms: state.total_duration_ms(),
                    },
                )
                .await?;

            step_states.push(state);

            if !succeeded {
                return Ok(PipelineReport {
                    step_states,
                    succeeded: false,
                });
            }
        }

        Ok(PipelineReport {
            step_states,
            succeeded: true,
        })
    }

    /// Demotes a `Success` outcome to `CriticalFailure` when the step left a
    /// required payload field empty, per spec §4.5's validation rule.
    fn validate_success_payload(&self, step: &dyn crate::step::Step, outcome: StepOutcome, state: &StepState) -> StepOutcome {
        let StepOutcome::Success { payload, .. } = &outcome else {
            return outcome;
        };
        let required = step.required_success_fields();
        if required.is_empty() {
            return outcome;
        }
        let missing = missing_required_fields(payload, required);
        if missing.is_empty() {
            return outcome;
        }
        let reason = format!("agent failed to populate {}", missing.join(", "));
        let failure_context = self.failure_collector.collect(
            step.name(),
            format!("{}_validation", step.name()),
            ErrorKind::NonRetryable,
            reason.clone(),
            "ValidationError",
            "",
            state,
            Vec::new(),
            None,
        );
        StepOutcome::CriticalFailure {
            reason,
            failure_context,
        }
    }

    fn apply_outcome(&self, state: &mut StepState, outcome: StepOutcome, ctx: &mut StepContext) {
        match outcome {
            StepOutcome::Success { reason, payload } => {
                ctx.prior_results.insert(state.name.clone(), payload);
                state.mark_success(reason);
            }
            StepOutcome::HardTermination {
                reason,
                mut failure_context,
            } => {
                failure_context.step_phase = format!("hard_termination_{}", state.name);
                state.mark_failure(reason, false, failure_context);
            }
            StepOutcome::RetryableFailure {
                reason,
                failure_context,
            } => {
                state.mark_failure(reason, true, failure_context);
            }
            StepOutcome::CriticalFailure {
                reason,
                failure_context,
            } => {
                state.mark_failure(reason, false, failure_context);
            }
        }
    }

    /// Whether this failure context's error kind, if present, is
    /// `Ignorable` — used by callers to decide whether to surface the
    /// pipeline result as a queue-level failure at all, per spec §4.6's
    /// "the step's own logic chooses whether to continue" rule: an
    /// ignorable failure that still reaches the driver as a failed
    /// `StepState` is, by construction, one the step chose not to absorb.
    pub fn is_ignorable(failure_context: &StepFailureContext) -> bool {
        failure_context.error_kind == ErrorKind::Ignorable
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
