// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ProcessStatus`: the document persisted by the Telemetry Store (`migr-storage`).
//!
//! `AgentActivity`'s reasoning-trail fields are supplemented from the
//! original Python telemetry module (`agent_telemetry.py`); the core treats
//! their content as opaque payload it stores and returns verbatim.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Upper bound on entries retained in an agent's `activity_history` ring
/// and `reasoning_steps` list.
pub const DEFAULT_ACTIVITY_HISTORY_LIMIT: usize = 100;

/// Upper bound on `message_preview` length (characters).
pub const MESSAGE_PREVIEW_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessLifecycle {
    #[default]
    Running,
    Completed,
    Failed,
}

/// Participation state of one agent within the current step.
///
/// Orchestration agents (the fixed roster named by configuration) are
/// exempt from the at-most-one-active rule; worker agents are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentParticipation {
    #[default]
    Standby,
    Ready,
    Active,
}

/// One recorded action in an agent's bounded activity history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub action: String,
    pub message_preview: String,
    pub tool_used: Option<String>,
    pub recorded_at: String,
}

/// Per-agent live state within a process, as tracked by the Telemetry Store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentActivity {
    pub participation: AgentParticipation,
    pub is_active: bool,
    pub current_action: String,
    pub message_preview: String,
    pub activity_history: Vec<ActivityEntry>,

    // Reasoning-trail supplement (agent_telemetry.py); opaque to the core.
    pub is_currently_speaking: bool,
    pub is_currently_thinking: bool,
    pub thinking_about: Option<String>,
    pub current_reasoning: Option<String>,
    pub last_reasoning: Option<String>,
    pub reasoning_steps: Vec<String>,
    pub step_reset_count: u32,
}

impl AgentActivity {
    pub fn standby() -> Self {
        Self {
            participation: AgentParticipation::Standby,
            is_active: false,
            current_action: String::new(),
            message_preview: String::new(),
            activity_history: Vec::new(),
            is_currently_speaking: false,
            is_currently_thinking: false,
            thinking_about: None,
            current_reasoning: None,
            last_reasoning: None,
            reasoning_steps: Vec::new(),
            step_reset_count: 0,
        }
    }

    pub fn ready() -> Self {
        Self {
            participation: AgentParticipation::Ready,
            ..Self::standby()
        }
    }

    /// Truncates `preview` to `MESSAGE_PREVIEW_LIMIT` characters, respecting
    /// UTF-8 boundaries.
    pub fn truncate_preview(preview: &str) -> String {
        if preview.chars().count() <= MESSAGE_PREVIEW_LIMIT {
            preview.to_string()
        } else {
            preview.chars().take(MESSAGE_PREVIEW_LIMIT).collect()
        }
    }

    /// Updates the current action, moving the prior action into history when
    /// it was non-idle, per spec §4.4 / §8.8.
    pub fn update_action(
        &mut self,
        action: impl Into<String>,
        message_preview: impl Into<String>,
        tool_used: Option<String>,
        recorded_at: impl Into<String>,
    ) {
        let action = action.into();
        let message_preview = Self::truncate_preview(&message_preview.into());
        let was_idle = self.current_action.is_empty();
        if !was_idle {
            self.activity_history.push(ActivityEntry {
                action: self.current_action.clone(),
                message_preview: self.message_preview.clone(),
                tool_used: tool_used.clone(),
                recorded_at: recorded_at.into(),
            });
            if self.activity_history.len() > DEFAULT_ACTIVITY_HISTORY_LIMIT {
                let overflow = self.activity_history.len() - DEFAULT_ACTIVITY_HISTORY_LIMIT;
                self.activity_history.drain(0..overflow);
            }
        }
        self.current_action = action;
        self.message_preview = message_preview;
        self.participation = AgentParticipation::Active;
        self.is_active = true;
    }

    pub fn reset_for_new_step(&mut self) {
        self.participation = AgentParticipation::Ready;
        self.is_active = false;
        self.current_action = String::new();
        self.message_preview = String::new();
        self.step_reset_count += 1;
    }

    /// Records a tool invocation into activity history and the reasoning
    /// trail, per `TrackToolUsage` in spec §4.4.
    pub fn record_tool_usage(
        &mut self,
        tool_name: impl Into<String>,
        tool_action: impl Into<String>,
        details: impl Into<String>,
        result_preview: impl Into<String>,
        recorded_at: impl Into<String>,
    ) {
        let tool_name = tool_name.into();
        let details = details.into();
        self.activity_history.push(ActivityEntry {
            action: tool_action.into(),
            message_preview: Self::truncate_preview(&result_preview.into()),
            tool_used: Some(tool_name.clone()),
            recorded_at: recorded_at.into(),
        });
        if self.activity_history.len() > DEFAULT_ACTIVITY_HISTORY_LIMIT {
            let overflow = self.activity_history.len() - DEFAULT_ACTIVITY_HISTORY_LIMIT;
            self.activity_history.drain(0..overflow);
        }
        self.record_reasoning_step(format!("used tool {tool_name}: {details}"));
    }

    pub fn record_reasoning_step(&mut self, reasoning: impl Into<String>) {
        let reasoning = reasoning.into();
        self.last_reasoning = self.current_reasoning.clone();
        self.current_reasoning = Some(reasoning.clone());
        self.reasoning_steps.push(reasoning);
        if self.reasoning_steps.len() > DEFAULT_ACTIVITY_HISTORY_LIMIT {
            let overflow = self.reasoning_steps.len() - DEFAULT_ACTIVITY_HISTORY_LIMIT;
            self.reasoning_steps.drain(0..overflow);
        }
    }
}

/// Summary of a completed step, as recorded by `RecordStepResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResultSummary {
    pub step_name: String,
    pub succeeded: bool,
    pub reason: String,
    pub total_duration_ms: Option<i64>,
}

/// The terminal outcome of a migration job, per spec §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalOutcome {
    pub success: bool,
    pub error_message: Option<String>,
    pub failed_step: Option<String>,
    pub details: serde_json::Value,
}

/// The document persisted by the Telemetry Store, keyed by `process_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessStatus {
    pub id: String,
    pub phase: String,
    pub step: String,
    pub status: ProcessLifecycle,
    pub started_at: String,
    pub last_update: String,

    pub agents: HashMap<String, AgentActivity>,
    pub step_results: HashMap<String, StepResultSummary>,
    pub final_outcome: Option<FinalOutcome>,

    pub failure_reason: Option<String>,
    pub failure_details: Option<String>,
    pub failure_step: Option<String>,
    pub failure_agent: Option<String>,
    pub failure_timestamp: Option<String>,
    pub stack_trace: Option<String>,

    pub generated_files: Vec<String>,
    pub conversion_metrics: HashMap<String, serde_json::Value>,
    pub ui_telemetry_data: serde_json::Value,
}

impl ProcessStatus {
    /// Seeds a new document with orchestration agents in `standby` and all
    /// other configured worker agents in `ready`.
    pub fn new(
        process_id: impl Into<String>,
        phase: impl Into<String>,
        step: impl Into<String>,
        started_at: impl Into<String>,
        orchestration_agents: &HashSet<String>,
        worker_agents: &HashSet<String>,
    ) -> Self {
        let started_at = started_at.into();
        let mut agents = HashMap::new();
        for name in orchestration_agents {
            agents.insert(name.clone(), AgentActivity::standby());
        }
        for name in worker_agents {
            agents.insert(name.clone(), AgentActivity::ready());
        }
        Self {
            id: process_id.into(),
            phase: phase.into(),
            step: step.into(),
            status: ProcessLifecycle::Running,
            started_at: started_at.clone(),
            last_update: started_at,
            agents,
            step_results: HashMap::new(),
            final_outcome: None,
            failure_reason: None,
            failure_details: None,
            failure_step: None,
            failure_agent: None,
            failure_timestamp: None,
            stack_trace: None,
            generated_files: Vec::new(),
            conversion_metrics: HashMap::new(),
            ui_telemetry_data: serde_json::Value::Null,
        }
    }

    /// True iff at most one non-orchestration agent is active, per spec §8.9.
    pub fn at_most_one_active_worker(&self, orchestration_agents: &HashSet<String>) -> bool {
        self.agents
            .iter()
            .filter(|(name, a)| !orchestration_agents.contains(*name) && a.is_active)
            .count()
            <= 1
    }

    pub fn mark_failed(
        &mut self,
        reason: impl Into<String>,
        details: Option<String>,
        failed_step: Option<String>,
        failed_agent: Option<String>,
        stack_trace: Option<String>,
        now: impl Into<String>,
    ) {
        let now = now.into();
        self.status = ProcessLifecycle::Failed;
        self.failure_reason = Some(reason.into());
        self.failure_details = details;
        self.failure_step = failed_step;
        self.failure_agent = failed_agent;
        self.failure_timestamp = Some(now.clone());
        self.stack_trace = stack_trace;
        self.last_update = now;
    }

    pub fn mark_completed(&mut self, outcome: FinalOutcome, now: impl Into<String>) {
        let now = now.into();
        self.status = if outcome.success {
            ProcessLifecycle::Completed
        } else {
            ProcessLifecycle::Failed
        };
        self.final_outcome = Some(outcome);
        self.last_update = now;
    }
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
