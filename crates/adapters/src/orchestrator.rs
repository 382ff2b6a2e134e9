// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `AgentOrchestrator`: the seam over the LLM agents and their group-chat
//! orchestration, out of scope per spec §1 ("the core treats a step as an
//! opaque coroutine returning a typed result"). Grounded on
//! `oj_adapters::agent::AgentAdapter`'s shape: a `Send + Sync + 'static`
//! async trait, a typed request/response pair, no raw SDK types threaded
//! through the pipeline.

use crate::error::AgentError;
use async_trait::async_trait;
use migr_core::MigrationRequest;
use serde_json::Value;
use std::collections::HashMap;

/// What a pipeline step asks the orchestrator to do: run the group-chat for
/// `step_name` against `request`, with the prior steps' typed payloads for
/// context.
#[derive(Debug, Clone)]
pub struct AgentInvocation {
    pub step_name: String,
    pub request: MigrationRequest,
    pub prior_results: HashMap<String, Value>,
}

/// The agent's typed answer for one step invocation, before the Step Driver
/// maps it to a `StepOutcome`. Mirrors spec §4.5's `succeed /
/// hard-terminate / retryable-failure / critical-failure` contract one
/// layer below the `Step` trait.
#[derive(Debug, Clone)]
pub enum AgentOutcome {
    Succeeded { reason: String, payload: Value },
    HardTerminated { reason: String },
    /// The orchestrator diagnosed the failure itself as a transient
    /// infrastructure hiccup (e.g. its own connection pool reset
    /// mid-call) that a fresh lease will clear, as opposed to an error
    /// the step caller has to run through the Error Classifier. Maps to
    /// `StepOutcome::RetryableFailure` (spec §4.5) one layer up.
    RetryableFailure { reason: String },
}

/// Out-of-scope collaborator: the LLM agents and their group-chat
/// orchestration (spec §1). A real implementation dispatches to the agent
/// framework; this trait is the seam a production deployment plugs one
/// into.
#[async_trait]
pub trait AgentOrchestrator: Send + Sync {
    async fn invoke(&self, invocation: AgentInvocation) -> Result<AgentOutcome, AgentError>;
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
