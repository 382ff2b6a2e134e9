// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake queue client for deterministic testing, grounded on
//! `oj_adapters::agent::fake::FakeAgentAdapter`'s call-recording convention.

use crate::error::{AgentError, QueueError};
use crate::orchestrator::{AgentInvocation, AgentOrchestrator, AgentOutcome};
use crate::queue_client::{DeadLetterEnvelope, QueueClient, RawQueueMessage};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Recorded call to `FakeQueueClient`.
#[derive(Debug, Clone)]
pub enum QueueCall {
    Receive,
    Delete { message_id: String },
    UpdateVisibility { message_id: String, visibility_timeout: Duration },
    SendToDeadLetter { message_id: String },
}

struct FakeQueueState {
    main_queue: VecDeque<RawQueueMessage>,
    dead_letters: Vec<DeadLetterEnvelope>,
    calls: Vec<QueueCall>,
    receive_error: Option<String>,
}

/// In-memory `QueueClient` double. Messages enqueued via
/// [`FakeQueueClient::enqueue`] are handed out in FIFO order by `receive`;
/// `delete` removes them from the fake's bookkeeping of in-flight receipts.
#[derive(Clone)]
pub struct FakeQueueClient {
    inner: Arc<Mutex<FakeQueueState>>,
}

impl Default for FakeQueueClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeQueueClient {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeQueueState {
                main_queue: VecDeque::new(),
                dead_letters: Vec::new(),
                calls: Vec::new(),
                receive_error: None,
            })),
        }
    }

    pub fn enqueue(&self, message: RawQueueMessage) {
        self.inner.lock().main_queue.push_back(message);
    }

    pub fn set_receive_error(&self, reason: impl Into<String>) {
        self.inner.lock().receive_error = Some(reason.into());
    }

    pub fn calls(&self) -> Vec<QueueCall> {
        self.inner.lock().calls.clone()
    }

    pub fn dead_letters(&self) -> Vec<DeadLetterEnvelope> {
        self.inner.lock().dead_letters.clone()
    }

    pub fn main_queue_len(&self) -> usize {
        self.inner.lock().main_queue.len()
    }
}

#[async_trait]
impl QueueClient for FakeQueueClient {
    async fn receive(&self, _visibility_timeout: Duration) -> Result<Option<RawQueueMessage>, QueueError> {
        let mut state = self.inner.lock();
        state.calls.push(QueueCall::Receive);
        if let Some(reason) = state.receive_error.clone() {
            return Err(QueueError::ReceiveFailed(reason));
        }
        Ok(state.main_queue.pop_front())
    }

    async fn delete(&self, message_id: &str, _pop_receipt: &str) -> Result<(), QueueError> {
        self.inner.lock().calls.push(QueueCall::Delete {
            message_id: message_id.to_string(),
        });
        Ok(())
    }

    async fn update_visibility(
        &self,
        message_id: &str,
        _pop_receipt: &str,
        visibility_timeout: Duration,
    ) -> Result<(), QueueError> {
        self.inner.lock().calls.push(QueueCall::UpdateVisibility {
            message_id: message_id.to_string(),
            visibility_timeout,
        });
        Ok(())
    }

    async fn send_to_dead_letter(&self, envelope: DeadLetterEnvelope) -> Result<(), QueueError> {
        let mut state = self.inner.lock();
        state.calls.push(QueueCall::SendToDeadLetter {
            message_id: envelope.process_id.clone().unwrap_or_default(),
        });
        state.dead_letters.push(envelope);
        Ok(())
    }
}

/// Scriptable `AgentOrchestrator` double, analogous to
/// `FakeQueueClient`/`oj_adapters::agent::fake::FakeAgentAdapter`: each call
/// is answered by a per-step closure so tests can drive every outcome
/// category without a real group-chat orchestrator.
pub struct FakeAgentOrchestrator {
    #[allow(clippy::type_complexity)]
    scripts: Mutex<std::collections::HashMap<String, Box<dyn FnMut(&AgentInvocation) -> Result<AgentOutcome, AgentError> + Send>>>,
    calls: Mutex<Vec<String>>,
}

impl Default for FakeAgentOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeAgentOrchestrator {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(std::collections::HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn script(
        &self,
        step_name: impl Into<String>,
        script: impl FnMut(&AgentInvocation) -> Result<AgentOutcome, AgentError> + Send + 'static,
    ) {
        self.scripts.lock().insert(step_name.into(), Box::new(script));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl AgentOrchestrator for FakeAgentOrchestrator {
    async fn invoke(&self, invocation: AgentInvocation) -> Result<AgentOutcome, AgentError> {
        self.calls.lock().push(invocation.step_name.clone());
        let mut scripts = self.scripts.lock();
        let Some(script) = scripts.get_mut(&invocation.step_name) else {
            return Err(AgentError::CallFailed {
                step: invocation.step_name.clone(),
                message: "no script registered for this step".to_string(),
            });
        };
        script(&invocation)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
