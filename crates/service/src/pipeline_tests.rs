// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use migr_adapters::FakeAgentOrchestrator;
use migr_core::{FakeClock, MigrationRequest, Priority, SequentialIdGen};

fn request() -> MigrationRequest {
    MigrationRequest {
        process_id: "p1".to_string(),
        user_id: "u1".to_string(),
        container_name: "processes".to_string(),
        source_folder: "p1/source".to_string(),
        workspace_folder: "p1/workspace".to_string(),
        output_folder: "p1/converted".to_string(),
        priority: Priority::Normal,
        created_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

#[tokio::test]
async fn orchestrated_step_maps_success_through_unchanged() {
    let orchestrator = Arc::new(FakeAgentOrchestrator::new());
    orchestrator.script("analysis", |_| {
        Ok(AgentOutcome::Succeeded {
            reason: "ok".to_string(),
            payload: serde_json::json!({"findings": "x"}),
        })
    });
    let step = OrchestratedStep::new(
        "analysis",
        orchestrator,
        ErrorClassifier::default(),
        FakeClock::new(1_000),
        SequentialIdGen::new("corr"),
    );
    let ctx = StepContext::new("p1", request());
    let mut state = StepState::new("analysis");
    let outcome = step.execute(&ctx, &mut state).await;
    assert!(outcome.is_success());
}

#[tokio::test]
async fn orchestrated_step_maps_hard_termination() {
    let orchestrator = Arc::new(FakeAgentOrchestrator::new());
    orchestrator.script("analysis", |_| {
        Ok(AgentOutcome::HardTerminated {
            reason: "hard termination: blocked".to_string(),
        })
    });
    let step = OrchestratedStep::new(
        "analysis",
        orchestrator,
        ErrorClassifier::default(),
        FakeClock::new(1_000),
        SequentialIdGen::new("corr"),
    );
    let ctx = StepContext::new("p1", request());
    let mut state = StepState::new("analysis");
    let outcome = step.execute(&ctx, &mut state).await;
    match outcome {
        StepOutcome::HardTermination { failure_context, .. } => {
            assert_eq!(failure_context.step_phase, "hard_termination_analysis");
        }
        _ => panic!("expected hard termination"),
    }
}

#[tokio::test]
async fn orchestrated_step_maps_retryable_failure_without_consulting_the_classifier() {
    let orchestrator = Arc::new(FakeAgentOrchestrator::new());
    orchestrator.script("design", |_| {
        Ok(AgentOutcome::RetryableFailure { reason: "connection pool reset".to_string() })
    });
    let step = OrchestratedStep::new(
        "design",
        orchestrator,
        ErrorClassifier::default(),
        FakeClock::new(1_000),
        SequentialIdGen::new("corr"),
    );
    let ctx = StepContext::new("p1", request());
    let mut state = StepState::new("design");
    let outcome = step.execute(&ctx, &mut state).await;
    match outcome {
        StepOutcome::RetryableFailure { reason, failure_context } => {
            assert_eq!(reason, "connection pool reset");
            assert_eq!(failure_context.error_kind, migr_core::ErrorKind::Retryable);
        }
        _ => panic!("expected an orchestrator-diagnosed retryable failure"),
    }
}

#[tokio::test]
async fn orchestrated_step_classifies_timeout_as_retryable() {
    let orchestrator = Arc::new(FakeAgentOrchestrator::new());
    orchestrator.script("design", |_| {
        Err(AgentError::Timeout { step: "design".to_string() })
    });
    let step = OrchestratedStep::new(
        "design",
        orchestrator,
        ErrorClassifier::default(),
        FakeClock::new(1_000),
        SequentialIdGen::new("corr"),
    );
    let ctx = StepContext::new("p1", request());
    let mut state = StepState::new("design");
    let outcome = step.execute(&ctx, &mut state).await;
    match outcome {
        StepOutcome::CriticalFailure { failure_context, .. } => {
            assert_eq!(failure_context.error_kind, migr_core::ErrorKind::Retryable);
        }
        _ => panic!("expected a classifier-driven critical failure"),
    }
}

#[tokio::test]
async fn orchestrated_step_absorbs_ignorable_errors_as_success() {
    let mut config = ClassifierConfig::default();
    config.ignorable_markers = vec!["service failed to comp".to_string()];
    let orchestrator = Arc::new(FakeAgentOrchestrator::new());
    orchestrator.script("yaml", |_| {
        Err(AgentError::CallFailed {
            step: "yaml".to_string(),
            message: "service failed to comp".to_string(),
        })
    });
    let step = OrchestratedStep::new(
        "yaml",
        orchestrator,
        ErrorClassifier::new(config),
        FakeClock::new(1_000),
        SequentialIdGen::new("corr"),
    );
    let ctx = StepContext::new("p1", request());
    let mut state = StepState::new("yaml");
    let outcome = step.execute(&ctx, &mut state).await;
    assert!(outcome.is_success());
}

#[test]
fn each_step_declares_its_documented_non_empty_fields() {
    let orchestrator = Arc::new(FakeAgentOrchestrator::new());
    for name in STEP_NAMES {
        let step = OrchestratedStep::new(
            name,
            orchestrator.clone(),
            ErrorClassifier::default(),
            FakeClock::new(0),
            SequentialIdGen::new("corr"),
        );
        assert!(
            !step.required_success_fields().is_empty(),
            "{name} must declare a non-empty required-field list per spec §4.5"
        );
    }
}

#[tokio::test]
async fn orchestrated_step_absorbs_ignorable_errors_with_a_payload_that_passes_validation() {
    let mut config = ClassifierConfig::default();
    config.ignorable_markers = vec!["service failed to comp".to_string()];
    let orchestrator = Arc::new(FakeAgentOrchestrator::new());
    orchestrator.script("yaml", |_| {
        Err(AgentError::CallFailed {
            step: "yaml".to_string(),
            message: "service failed to comp".to_string(),
        })
    });
    let step = OrchestratedStep::new(
        "yaml",
        orchestrator,
        ErrorClassifier::new(config),
        FakeClock::new(1_000),
        SequentialIdGen::new("corr"),
    );
    let ctx = StepContext::new("p1", request());
    let mut state = StepState::new("yaml");
    let outcome = step.execute(&ctx, &mut state).await;
    let StepOutcome::Success { payload, .. } = outcome else {
        panic!("expected the ignorable error to be absorbed as success");
    };
    let missing = migr_engine::missing_required_fields(&payload, step.required_success_fields());
    assert!(missing.is_empty(), "absorbed payload must satisfy its own required fields, missing: {missing:?}");
}

#[test]
fn build_pipeline_produces_steps_in_fixed_order() {
    let orchestrator = Arc::new(FakeAgentOrchestrator::new());
    let steps = build_pipeline(
        orchestrator,
        ClassifierConfig::default(),
        FakeClock::new(0),
        SequentialIdGen::new("corr"),
    );
    let names: Vec<&str> = steps.iter().map(|s| s.name()).collect();
    assert_eq!(names, STEP_NAMES.to_vec());
}
