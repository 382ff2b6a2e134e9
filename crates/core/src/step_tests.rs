// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

fn failure_context() -> StepFailureContext {
    StepFailureContext {
        step_name: "analysis".into(),
        step_phase: "orchestration".into(),
        error_kind: ErrorKind::Retryable,
        message: "timeout".into(),
        exception_type: "TimeoutError".into(),
        stack_trace: String::new(),
        captured_at: "2026-01-01T00:00:00Z".into(),
        execution_time_ms: 500,
        files_attempted: vec![],
        system_context: HashMap::new(),
        correlation_id: None,
    }
}

#[test]
fn new_step_state_is_not_started() {
    let state = StepState::new("analysis");
    assert_eq!(state.result, StepResult::NotStarted);
    assert!(state.failure_context.is_none());
}

#[test]
fn mark_success_clears_failure_context() {
    let mut state = StepState::new("analysis");
    state.mark_failure("boom", false, failure_context());
    state.mark_success("ok");
    assert_eq!(state.result, StepResult::Success);
    assert!(state.failure_context.is_none());
}

#[test]
fn mark_failure_sets_fields() {
    let mut state = StepState::new("analysis");
    state.mark_failure("boom", true, failure_context());
    assert_eq!(state.result, StepResult::Failure);
    assert!(state.requires_immediate_retry);
    assert!(state.failure_context.is_some());
}

#[test]
fn durations_are_none_without_timings() {
    let state = StepState::new("analysis");
    assert_eq!(state.setup_duration_ms(), None);
    assert_eq!(state.orchestration_duration_ms(), None);
    assert_eq!(state.total_duration_ms(), None);
}

#[test]
fn durations_computed_from_timings() {
    let mut state = StepState::new("analysis");
    state.set_execution_start(1_000);
    state.set_orchestration_start(1_200);
    state.set_orchestration_end(1_700);
    state.set_execution_end(1_900);
    assert_eq!(state.setup_duration_ms(), Some(200));
    assert_eq!(state.orchestration_duration_ms(), Some(500));
    assert_eq!(state.total_duration_ms(), Some(900));
}

#[test]
fn total_equals_setup_plus_orchestration_plus_teardown() {
    let mut state = StepState::new("analysis");
    state.set_execution_start(1_000);
    state.set_orchestration_start(1_200);
    state.set_orchestration_end(1_700);
    state.set_execution_end(1_900);
    let teardown = state.execution_end.unwrap() - state.orchestration_end.unwrap();
    let sum = state.setup_duration_ms().unwrap() + state.orchestration_duration_ms().unwrap() + teardown;
    assert_eq!(sum, state.total_duration_ms().unwrap());
}

#[test]
fn timings_well_ordered_true_without_timings() {
    let state = StepState::new("analysis");
    assert!(state.timings_well_ordered());
}

#[test]
fn timings_well_ordered_true_for_monotonic_sequence() {
    let mut state = StepState::new("analysis");
    state.set_execution_start(1_000);
    state.set_orchestration_start(1_200);
    state.set_orchestration_end(1_700);
    state.set_execution_end(1_900);
    assert!(state.timings_well_ordered());
}

#[test]
fn timings_well_ordered_false_for_out_of_order_sequence() {
    let mut state = StepState::new("analysis");
    state.set_execution_start(1_000);
    state.set_orchestration_start(900);
    state.set_orchestration_end(1_700);
    state.set_execution_end(1_900);
    assert!(!state.timings_well_ordered());
}
