// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use migr_core::{FakeClock, SequentialIdGen};

#[test]
fn parameter_validation_is_always_critical() {
    assert_eq!(
        classify_severity("parameter_validation", ErrorKind::Retryable, false),
        Severity::Critical
    );
}

#[test]
fn authentication_is_always_critical() {
    assert_eq!(
        classify_severity("step_authentication", ErrorKind::Ignorable, false),
        Severity::Critical
    );
}

#[test]
fn timeout_is_high_regardless_of_phase() {
    assert_eq!(
        classify_severity("conversion", ErrorKind::Retryable, true),
        Severity::High
    );
}

#[test]
fn yaml_parsing_is_medium() {
    assert_eq!(
        classify_severity("yaml_parsing", ErrorKind::NonRetryable, false),
        Severity::Medium
    );
}

#[test]
fn default_falls_back_to_classifier_bucket() {
    assert_eq!(
        classify_severity("analysis", ErrorKind::Ignorable, false),
        Severity::Low
    );
    assert_eq!(
        classify_severity("analysis", ErrorKind::Poison, false),
        Severity::Critical
    );
}

#[test]
fn collect_derives_execution_time_from_state_and_stamps_correlation_id() {
    let clock = FakeClock::new(1_000);
    let collector = FailureCollector::new(clock.clone(), SequentialIdGen::new("corr"));
    let mut state = StepState::new("Analysis");
    state.set_execution_start(1_000);
    clock.advance_ms(500);

    let ctx = collector.collect(
        "Analysis",
        "hard_termination_analysis",
        ErrorKind::NonRetryable,
        "boom",
        "ValueError",
        "traceback...",
        &state,
        vec!["a.yaml".to_string()],
        None,
    );

    assert_eq!(ctx.execution_time_ms, 500);
    assert_eq!(ctx.correlation_id.as_deref(), Some("corr-1"));
    assert_eq!(ctx.files_attempted, vec!["a.yaml".to_string()]);
}

#[test]
fn collect_reuses_a_supplied_correlation_id() {
    let clock = FakeClock::new(0);
    let collector = FailureCollector::new(clock, SequentialIdGen::new("corr"));
    let state = StepState::new("Analysis");
    let ctx = collector.collect(
        "Analysis",
        "retryable_failure",
        ErrorKind::Retryable,
        "timeout",
        "TimeoutError",
        "",
        &state,
        vec![],
        Some("stable-id".to_string()),
    );
    assert_eq!(ctx.correlation_id.as_deref(), Some("stable-id"));
}
