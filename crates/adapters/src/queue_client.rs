// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `QueueClient`: the seam over the Azure Storage Queue SDK (out of scope
//! per spec §1), grounded on `oj_adapters::AgentAdapter`'s shape (`Clone +
//! Send + Sync + 'static`, async methods, typed request/response structs).

use crate::error::QueueError;
use async_trait::async_trait;
use std::time::Duration;

/// A message as received off the wire, before Message Codec decoding.
#[derive(Debug, Clone)]
pub struct RawQueueMessage {
    pub message_id: String,
    pub pop_receipt: String,
    pub dequeue_count: u32,
    pub body: Vec<u8>,
}

/// The dead-letter envelope, per spec §4.7: original bytes plus failure
/// metadata. Per DESIGN.md Open Question 3, this carries only queue-level
/// fields — the full `StepFailureContext` stays in the Telemetry Store.
#[derive(Debug, Clone)]
pub struct DeadLetterEnvelope {
    pub raw_payload: Vec<u8>,
    pub failure_reason: String,
    pub failure_time: String,
    pub retry_count: u32,
    pub process_id: Option<String>,
    pub is_poison_message: bool,
}

/// Backend-agnostic queue operations the Queue Service outer loop needs:
/// receive, delete (ack), update visibility (requeue-immediate /
/// requeue-backoff), and send-to-dead-letter.
#[async_trait]
pub trait QueueClient: Clone + Send + Sync + 'static {
    /// Receives at most one message, leasing it for `visibility_timeout`.
    /// Returns `None` when the queue is empty.
    async fn receive(&self, visibility_timeout: Duration) -> Result<Option<RawQueueMessage>, QueueError>;

    /// Deletes (acknowledges) a message by its pop receipt.
    async fn delete(&self, message_id: &str, pop_receipt: &str) -> Result<(), QueueError>;

    /// Updates a leased message's visibility timeout; `Duration::ZERO` makes
    /// it immediately redeliverable.
    async fn update_visibility(
        &self,
        message_id: &str,
        pop_receipt: &str,
        visibility_timeout: Duration,
    ) -> Result<(), QueueError>;

    /// Copies `envelope` to the dead-letter queue. Callers are responsible
    /// for deleting the original message from the main queue afterward.
    async fn send_to_dead_letter(&self, envelope: DeadLetterEnvelope) -> Result<(), QueueError>;
}

#[cfg(test)]
#[path = "queue_client_tests.rs"]
mod tests;
