// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-only `Step` double, analogous to the teacher's
//! `oj_adapters::FakeAgentAdapter` (a scriptable stand-in for the real
//! async-trait implementation, gated the same way behind a `test-support`
//! feature).

use crate::outcome::StepOutcome;
use crate::step::{Step, StepContext};
use async_trait::async_trait;
use migr_core::StepState;
use parking_lot::Mutex;

/// A `Step` whose result is scripted ahead of time via a closure, so tests
/// can drive a `StepDriver` through every outcome category without a real
/// orchestrator.
pub struct FakeStep {
    name: String,
    required_fields: Vec<&'static str>,
    script: Mutex<Box<dyn FnMut(&StepContext) -> StepOutcome + Send>>,
}

impl FakeStep {
    pub fn new(
        name: impl Into<String>,
        required_fields: Vec<&'static str>,
        script: impl FnMut(&StepContext) -> StepOutcome + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            required_fields,
            script: Mutex::new(Box::new(script)),
        }
    }

    /// Convenience constructor for a step that always succeeds with `payload`.
    pub fn always_succeeds(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::new(name, Vec::new(), move |_ctx| StepOutcome::Success {
            reason: "ok".to_string(),
            payload: payload.clone(),
        })
    }
}

#[async_trait]
impl Step for FakeStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_success_fields(&self) -> &[&str] {
        &self.required_fields
    }

    async fn execute(&self, ctx: &StepContext, _state: &mut StepState) -> StepOutcome {
        (self.script.lock())(ctx)
    }
}
