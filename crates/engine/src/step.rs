// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Step contract (spec §4.5), grounded on `oj_adapters::AgentAdapter`'s
//! shape: a `Clone + Send + Sync + 'static` async trait with a single
//! entry-point method and a typed handle carrying everything the
//! implementation needs.

use crate::outcome::StepOutcome;
use async_trait::async_trait;
use migr_core::{MigrationRequest, StepState};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-job, per-step execution context: the request, the accumulated
/// results of prior steps, and the process id the step should tag its
/// telemetry calls with.
pub struct StepContext {
    pub process_id: String,
    pub request: MigrationRequest,
    pub prior_results: HashMap<String, Value>,
}

impl StepContext {
    pub fn new(process_id: impl Into<String>, request: MigrationRequest) -> Self {
        Self {
            process_id: process_id.into(),
            request,
            prior_results: HashMap::new(),
        }
    }

    /// The typed payload a named prior step produced, if it ran and succeeded.
    pub fn prior_payload(&self, step_name: &str) -> Option<&Value> {
        self.prior_results.get(step_name)
    }
}

/// One step in the fixed-order pipeline (spec §4.6). The driver enforces
/// `set_execution_start`/`set_execution_end` uniformly at entry/exit (spec
/// §4.5 items 1 and 4 describe exactly the step's entry and return);
/// `set_orchestration_start`/`set_orchestration_end` remain the
/// implementation's own responsibility, called on `state` around the call
/// to the external orchestrator, since only the step knows when that begins
/// and ends.
#[async_trait]
pub trait Step: Send + Sync {
    /// Stable step identity, used as the telemetry phase/step name and as
    /// the key other steps look up this step's payload under.
    fn name(&self) -> &str;

    /// Non-empty field list a `Success` payload must populate. An empty
    /// slice means no validation is performed.
    fn required_success_fields(&self) -> &[&str] {
        &[]
    }

    async fn execute(&self, ctx: &StepContext, state: &mut StepState) -> StepOutcome;
}

/// Blanket impl so steps can be stored and driven through an `Arc<dyn Step>`.
pub type SharedStep = Arc<dyn Step>;

/// Checks `outcome`'s payload (if `Success`) against `required_fields`,
/// returning the names of any fields that are absent or JSON `null`/empty
/// string.
pub fn missing_required_fields(payload: &Value, required_fields: &[&str]) -> Vec<String> {
    required_fields
        .iter()
        .filter(|field| match payload.get(field) {
            None => true,
            Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            _ => false,
        })
        .map(|field| field.to_string())
        .collect()
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
