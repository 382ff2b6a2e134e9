// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Queue backend adapter (spec §4.7/§6): the seam over the Azure Storage
//! Queue SDK, out of scope per spec §1.

mod error;
#[cfg(any(test, feature = "test-support"))]
mod fake;
mod orchestrator;
mod queue_client;

pub use error::{AgentError, QueueError};
pub use orchestrator::{AgentInvocation, AgentOrchestrator, AgentOutcome};
pub use queue_client::{DeadLetterEnvelope, QueueClient, RawQueueMessage};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeAgentOrchestrator, FakeQueueClient, QueueCall};
