// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use migr_core::MigrationRequest;
use std::collections::HashMap;

fn message(id: &str) -> RawQueueMessage {
    RawQueueMessage {
        message_id: id.to_string(),
        pop_receipt: format!("{id}-receipt"),
        dequeue_count: 0,
        body: b"{}".to_vec(),
    }
}

#[tokio::test]
async fn receive_hands_out_messages_in_fifo_order() {
    let client = FakeQueueClient::new();
    client.enqueue(message("m1"));
    client.enqueue(message("m2"));
    let first = client.receive(Duration::from_secs(5)).await.unwrap().unwrap();
    assert_eq!(first.message_id, "m1");
    let second = client.receive(Duration::from_secs(5)).await.unwrap().unwrap();
    assert_eq!(second.message_id, "m2");
    assert!(client.receive(Duration::from_secs(5)).await.unwrap().is_none());
}

#[tokio::test]
async fn receive_error_is_surfaced() {
    let client = FakeQueueClient::new();
    client.set_receive_error("backend unavailable");
    let err = client.receive(Duration::from_secs(5)).await.unwrap_err();
    assert!(matches!(err, QueueError::ReceiveFailed(_)));
}

#[tokio::test]
async fn send_to_dead_letter_records_envelope() {
    let client = FakeQueueClient::new();
    client
        .send_to_dead_letter(DeadLetterEnvelope {
            raw_payload: b"bad".to_vec(),
            failure_reason: "poison_message".to_string(),
            failure_time: "2026-01-01T00:00:00Z".to_string(),
            retry_count: 0,
            process_id: Some("p1".to_string()),
            is_poison_message: true,
        })
        .await
        .unwrap();
    assert_eq!(client.dead_letters().len(), 1);
    assert!(matches!(client.calls().as_slice(), [QueueCall::SendToDeadLetter { .. }]));
}

#[tokio::test]
async fn delete_and_update_visibility_are_recorded() {
    let client = FakeQueueClient::new();
    client.delete("m1", "r1").await.unwrap();
    client
        .update_visibility("m1", "r1", Duration::from_secs(30))
        .await
        .unwrap();
    assert_eq!(client.calls().len(), 2);
}

fn invocation(step_name: &str) -> AgentInvocation {
    AgentInvocation {
        step_name: step_name.to_string(),
        request: MigrationRequest {
            process_id: "p1".to_string(),
            user_id: "u1".to_string(),
            container_name: "processes".to_string(),
            source_folder: "p1/source".to_string(),
            workspace_folder: "p1/workspace".to_string(),
            output_folder: "p1/converted".to_string(),
            priority: migr_core::Priority::Normal,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        },
        prior_results: HashMap::new(),
    }
}

#[tokio::test]
async fn orchestrator_runs_the_scripted_outcome_for_the_named_step() {
    let orchestrator = FakeAgentOrchestrator::new();
    orchestrator.script("analysis", |_inv| {
        Ok(AgentOutcome::Succeeded {
            reason: "ok".to_string(),
            payload: serde_json::json!({"findings": "none"}),
        })
    });
    let outcome = orchestrator.invoke(invocation("analysis")).await.unwrap();
    assert!(matches!(outcome, AgentOutcome::Succeeded { .. }));
    assert_eq!(orchestrator.calls(), vec!["analysis".to_string()]);
}

#[tokio::test]
async fn orchestrator_errors_when_no_script_is_registered() {
    let orchestrator = FakeAgentOrchestrator::new();
    let err = orchestrator.invoke(invocation("design")).await.unwrap_err();
    assert!(matches!(err, AgentError::CallFailed { .. }));
}

#[tokio::test]
async fn orchestrator_passes_through_a_scripted_retryable_failure() {
    let orchestrator = FakeAgentOrchestrator::new();
    orchestrator.script("design", |_inv| {
        Ok(AgentOutcome::RetryableFailure {
            reason: "connection pool reset".to_string(),
        })
    });
    let outcome = orchestrator.invoke(invocation("design")).await.unwrap();
    match outcome {
        AgentOutcome::RetryableFailure { reason } => assert_eq!(reason, "connection pool reset"),
        _ => panic!("expected a retryable failure"),
    }
}
