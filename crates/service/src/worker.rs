// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-worker outer receive loop (spec §4.7): receive → decode → drive
//! the pipeline → ack/requeue/DLQ → emit telemetry. Grounded on
//! `oj_engine::runtime::handlers::worker::{polling,dispatch,completion}`'s
//! split of a worker's lifecycle into named phases, adapted from an
//! in-process event loop to a queue-backed receive loop.

use crate::config::Config;
use migr_adapters::{DeadLetterEnvelope, QueueClient, QueueError, RawQueueMessage};
use migr_codec::MessageCodec;
use migr_core::{Clock, ErrorKind, FinalOutcome, IdGen, RetryAction};
use migr_engine::{StepContext, StepDriver};
use migr_policy::RetryPolicy;
use migr_storage::TelemetryStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// One outer receive loop. Stateless between messages apart from its shared
/// collaborators (spec §5: "No in-memory cross-message state").
pub struct Worker<Q: QueueClient, C: Clock, I: IdGen> {
    pub worker_id: String,
    queue: Q,
    codec: MessageCodec<C>,
    telemetry: Arc<dyn TelemetryStore>,
    driver: Arc<StepDriver<C, I>>,
    retry_policy: RetryPolicy,
    clock: C,
    config: Arc<Config>,
}

impl<Q: QueueClient, C: Clock, I: IdGen> Worker<Q, C, I> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        worker_id: impl Into<String>,
        queue: Q,
        codec: MessageCodec<C>,
        telemetry: Arc<dyn TelemetryStore>,
        driver: Arc<StepDriver<C, I>>,
        retry_policy: RetryPolicy,
        clock: C,
        config: Arc<Config>,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            queue,
            codec,
            telemetry,
            driver,
            retry_policy,
            clock,
            config,
        }
    }

    /// Runs the receive loop until `running` is cleared. No new `receive`
    /// calls are issued once `running` goes false (spec §4.7's graceful
    /// shutdown rule / testable property 10).
    pub async fn run(&self, running: Arc<AtomicBool>) {
        while running.load(Ordering::Acquire) {
            match self.queue.receive(self.config.visibility_timeout).await {
                Ok(Some(message)) => self.handle_message(message).await,
                Ok(None) => tokio::time::sleep(self.config.poll_interval).await,
                Err(err) => {
                    error!(worker = %self.worker_id, error = %err, "queue receive failed");
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }
    }

    async fn handle_message(&self, message: RawQueueMessage) {
        let request = match self.codec.decode(&message.body) {
            Ok(request) => request,
            Err(err) => {
                warn!(worker = %self.worker_id, error = %err, "poison message, routing to dead-letter queue");
                self.dead_letter_raw(&message, "poison_message", true).await;
                self.ack(&message).await;
                return;
            }
        };

        let process_id = request.process_id.clone();
        if matches!(self.telemetry.get_process(&process_id).await, Ok(None)) {
            if let Err(err) = self.telemetry.init_process(&process_id, "pending", "pending").await {
                error!(worker = %self.worker_id, process_id = %process_id, error = %err, "failed to initialize telemetry document");
            }
        }

        let mut ctx = StepContext::new(process_id.clone(), request);
        let drive = self.driver.drive(&mut ctx);

        match tokio::time::timeout(self.config.message_timeout, drive).await {
            Err(_elapsed) => {
                warn!(worker = %self.worker_id, process_id = %process_id, "pipeline exceeded message timeout");
                self.route_failure(
                    &message,
                    &process_id,
                    false,
                    ErrorKind::Retryable,
                    "message processing exceeded the configured timeout".to_string(),
                    None,
                )
                .await;
            }
            Ok(Err(err)) => {
                error!(worker = %self.worker_id, process_id = %process_id, error = %err, "step driver error");
                self.route_failure(
                    &message,
                    &process_id,
                    false,
                    ErrorKind::NonRetryable,
                    err.to_string(),
                    None,
                )
                .await;
            }
            Ok(Ok(report)) if report.succeeded => {
                if let Err(err) = self
                    .telemetry
                    .record_final_outcome(
                        &process_id,
                        FinalOutcome {
                            success: true,
                            error_message: None,
                            failed_step: None,
                            details: serde_json::json!({}),
                        },
                    )
                    .await
                {
                    error!(worker = %self.worker_id, process_id = %process_id, error = %err, "failed to record final outcome");
                }
                self.ack(&message).await;
            }
            Ok(Ok(report)) => {
                let final_state = report
                    .final_state()
                    .expect("non-empty pipeline always yields at least one step state");
                let classification = final_state
                    .failure_context
                    .as_ref()
                    .map(|ctx| ctx.error_kind)
                    .unwrap_or(ErrorKind::NonRetryable);
                self.route_failure(
                    &message,
                    &process_id,
                    final_state.requires_immediate_retry,
                    classification,
                    final_state.reason.clone(),
                    Some(final_state.name.clone()),
                )
                .await;
            }
        }
    }

    /// Applies the Retry Policy's decision (spec §4.7's outcome-routing
    /// table) and enacts it against the queue and Telemetry Store.
    async fn route_failure(
        &self,
        message: &RawQueueMessage,
        process_id: &str,
        requires_immediate_retry: bool,
        classification: ErrorKind,
        reason: String,
        failed_step: Option<String>,
    ) {
        let decision = self.retry_policy.decide(requires_immediate_retry, classification, message.dequeue_count, &reason);

        match decision.action {
            RetryAction::RequeueImmediate => {
                info!(worker = %self.worker_id, process_id = %process_id, reason = %decision.reason, "IMMEDIATE_RETRY");
                self.update_visibility(message, 0).await;
            }
            RetryAction::RequeueBackoff => {
                info!(worker = %self.worker_id, process_id = %process_id, delay_seconds = decision.delay_seconds, reason = %decision.reason, "EXPONENTIAL_BACKOFF");
                self.update_visibility(message, decision.visibility_timeout_seconds).await;
            }
            RetryAction::DeadLetter => {
                info!(worker = %self.worker_id, process_id = %process_id, reason = %decision.reason, "DEAD_LETTER");
                if let Err(err) = self
                    .telemetry
                    .record_failure_outcome(process_id, &decision.reason, failed_step, None)
                    .await
                {
                    error!(worker = %self.worker_id, process_id = %process_id, error = %err, "failed to record failure outcome");
                }
                self.dead_letter(message, process_id, &decision.reason, false).await;
                self.ack(message).await;
            }
        }
    }

    async fn dead_letter(&self, message: &RawQueueMessage, process_id: &str, reason: &str, is_poison_message: bool) {
        let envelope = DeadLetterEnvelope {
            raw_payload: message.body.clone(),
            failure_reason: reason.to_string(),
            failure_time: self.clock.now_iso8601(),
            retry_count: message.dequeue_count,
            process_id: Some(process_id.to_string()),
            is_poison_message,
        };
        if let Err(err) = self.queue.send_to_dead_letter(envelope).await {
            error!(worker = %self.worker_id, process_id = %process_id, error = %err, "failed to send message to dead-letter queue");
        }
    }

    /// Poison-message fast path (spec §4.7, testable property 5): no
    /// telemetry document is created, since the payload never decoded into
    /// a `process_id` the store can key on.
    async fn dead_letter_raw(&self, message: &RawQueueMessage, reason: &str, is_poison_message: bool) {
        let envelope = DeadLetterEnvelope {
            raw_payload: message.body.clone(),
            failure_reason: reason.to_string(),
            failure_time: self.clock.now_iso8601(),
            retry_count: message.dequeue_count,
            process_id: None,
            is_poison_message,
        };
        if let Err(err) = self.queue.send_to_dead_letter(envelope).await {
            error!(worker = %self.worker_id, error = %err, "failed to send poison message to dead-letter queue");
        }
    }

    async fn ack(&self, message: &RawQueueMessage) {
        self.handle_queue_result(self.queue.delete(&message.message_id, &message.pop_receipt).await, "delete");
    }

    async fn update_visibility(&self, message: &RawQueueMessage, visibility_timeout_seconds: u64) {
        let result = self
            .queue
            .update_visibility(
                &message.message_id,
                &message.pop_receipt,
                std::time::Duration::from_secs(visibility_timeout_seconds),
            )
            .await;
        self.handle_queue_result(result, "update_visibility");
    }

    /// Spec §4.7's delete semantics / §7's propagation policy: a lease
    /// expiry race is equivalent to the message already having been
    /// handled by another worker, not an error; other queue-backend errors
    /// are logged but never fail the job.
    fn handle_queue_result(&self, result: Result<(), QueueError>, op: &str) {
        match result {
            Ok(()) => {}
            Err(QueueError::LeaseExpired(id)) => {
                debug!(worker = %self.worker_id, message_id = %id, %op, "lease expired or already handled by another worker");
            }
            Err(err) => {
                error!(worker = %self.worker_id, %op, error = %err, "queue operation failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
