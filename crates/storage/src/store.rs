// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry Store (spec §4.4): bounded-concurrency CRUD over `ProcessStatus`
//! documents, grounded on `oj-storage::state::MaterializedState`'s
//! keyed-HashMap-of-structs shape.

use crate::error::StorageError;
use async_trait::async_trait;
use migr_core::{Clock, FinalOutcome, ProcessStatus, StepResultSummary};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tokio::sync::{Semaphore, SemaphorePermit};

/// Default bound on concurrent reads, per spec §4.4 / §5.
pub const DEFAULT_MAX_CONCURRENT_READS: usize = 50;
/// Default bound on concurrent writes, per spec §4.4 / §5.
pub const DEFAULT_MAX_CONCURRENT_WRITES: usize = 10;

/// Async CRUD contract over `ProcessStatus` documents, keyed by `process_id`.
///
/// A real implementation would adapt a document-store SDK (Cosmos DB, per
/// spec §6); that SDK is out of scope (spec §1), so this trait is the seam a
/// future adapter substitutes into.
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    async fn init_process(
        &self,
        process_id: &str,
        phase: &str,
        step: &str,
    ) -> Result<(), StorageError>;

    #[allow(clippy::too_many_arguments)]
    async fn update_agent_activity(
        &self,
        process_id: &str,
        agent_name: &str,
        action: &str,
        message_preview: &str,
        tool_used: Option<String>,
        reset_for_new_step: bool,
    ) -> Result<(), StorageError>;

    #[allow(clippy::too_many_arguments)]
    async fn track_tool_usage(
        &self,
        process_id: &str,
        agent_name: &str,
        tool_name: &str,
        tool_action: &str,
        details: &str,
        result_preview: &str,
    ) -> Result<(), StorageError>;

    async fn transition_to_phase(
        &self,
        process_id: &str,
        phase: &str,
        step: &str,
    ) -> Result<(), StorageError>;

    async fn record_step_result(
        &self,
        process_id: &str,
        step_name: &str,
        summary: StepResultSummary,
    ) -> Result<(), StorageError>;

    async fn record_final_outcome(
        &self,
        process_id: &str,
        outcome: FinalOutcome,
    ) -> Result<(), StorageError>;

    async fn record_failure_outcome(
        &self,
        process_id: &str,
        error: &str,
        failed_step: Option<String>,
        details: Option<String>,
    ) -> Result<(), StorageError>;

    async fn get_final_outcome(
        &self,
        process_id: &str,
    ) -> Result<Option<FinalOutcome>, StorageError>;

    async fn get_process(&self, process_id: &str) -> Result<Option<ProcessStatus>, StorageError>;

    /// Clone of every tracked document; used by external observers (status
    /// APIs, batch updaters) and by tests. Mirrors the checkpointer's
    /// clone-then-persist split without the core scheduling its own
    /// checkpointing (see DESIGN.md Open Question 3's neighbor note).
    async fn snapshot(&self) -> Result<Vec<ProcessStatus>, StorageError>;
}

/// In-memory `TelemetryStore`, used by the service's default wiring and by tests.
pub struct InMemoryTelemetryStore<C: Clock> {
    documents: Mutex<HashMap<String, ProcessStatus>>,
    read_semaphore: Semaphore,
    write_semaphore: Semaphore,
    orchestration_agents: HashSet<String>,
    worker_agents: HashSet<String>,
    clock: C,
}

impl<C: Clock> InMemoryTelemetryStore<C> {
    pub fn new(clock: C, orchestration_agents: HashSet<String>, worker_agents: HashSet<String>) -> Self {
        Self::with_bounds(
            clock,
            orchestration_agents,
            worker_agents,
            DEFAULT_MAX_CONCURRENT_READS,
            DEFAULT_MAX_CONCURRENT_WRITES,
        )
    }

    pub fn with_bounds(
        clock: C,
        orchestration_agents: HashSet<String>,
        worker_agents: HashSet<String>,
        max_concurrent_reads: usize,
        max_concurrent_writes: usize,
    ) -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            read_semaphore: Semaphore::new(max_concurrent_reads),
            write_semaphore: Semaphore::new(max_concurrent_writes),
            orchestration_agents,
            worker_agents,
            clock,
        }
    }

    fn now(&self) -> String {
        self.clock.now_iso8601()
    }

    async fn acquire_write(&self) -> Result<SemaphorePermit<'_>, StorageError> {
        self.write_semaphore
            .acquire()
            .await
            .map_err(|_| StorageError::ConcurrencyLimitClosed)
    }

    async fn acquire_read(&self) -> Result<SemaphorePermit<'_>, StorageError> {
        self.read_semaphore
            .acquire()
            .await
            .map_err(|_| StorageError::ConcurrencyLimitClosed)
    }

    fn with_process<T>(
        &self,
        process_id: &str,
        f: impl FnOnce(&mut ProcessStatus) -> T,
    ) -> Result<T, StorageError> {
        let mut documents = self.documents.lock();
        let doc = documents
            .get_mut(process_id)
            .ok_or_else(|| StorageError::ProcessNotFound(process_id.to_string()))?;
        Ok(f(doc))
    }
}

#[async_trait]
impl<C: Clock + 'static> TelemetryStore for InMemoryTelemetryStore<C> {
    async fn init_process(&self, process_id: &str, phase: &str, step: &str) -> Result<(), StorageError> {
        let _permit = self.acquire_write().await?;
        let doc = ProcessStatus::new(
            process_id,
            phase,
            step,
            self.now(),
            &self.orchestration_agents,
            &self.worker_agents,
        );
        self.documents.lock().insert(process_id.to_string(), doc);
        Ok(())
    }

    async fn update_agent_activity(
        &self,
        process_id: &str,
        agent_name: &str,
        action: &str,
        message_preview: &str,
        tool_used: Option<String>,
        reset_for_new_step: bool,
    ) -> Result<(), StorageError> {
        let _permit = self.acquire_write().await?;
        let now = self.now();
        let orchestration_agents = self.orchestration_agents.clone();
        self.with_process(process_id, move |doc| {
            // At most one non-orchestration agent stays active at a time.
            if !orchestration_agents.contains(agent_name) {
                for (name, other) in doc.agents.iter_mut() {
                    if name != agent_name && !orchestration_agents.contains(name) {
                        other.is_active = false;
                        if other.participation == migr_core::AgentParticipation::Active {
                            other.participation = migr_core::AgentParticipation::Ready;
                        }
                    }
                }
            }
            let entry = doc
                .agents
                .entry(agent_name.to_string())
                .or_insert_with(migr_core::AgentActivity::ready);
            if reset_for_new_step {
                entry.reset_for_new_step();
            }
            entry.update_action(action, message_preview, tool_used, now.clone());
            doc.last_update = now;
        })?;
        Ok(())
    }

    async fn track_tool_usage(
        &self,
        process_id: &str,
        agent_name: &str,
        tool_name: &str,
        tool_action: &str,
        details: &str,
        result_preview: &str,
    ) -> Result<(), StorageError> {
        let _permit = self.acquire_write().await?;
        let now = self.now();
        self.with_process(process_id, move |doc| -> Result<(), StorageError> {
            let entry = doc.agents.get_mut(agent_name).ok_or_else(|| StorageError::AgentNotFound {
                process_id: process_id.to_string(),
                agent: agent_name.to_string(),
            })?;
            entry.record_tool_usage(tool_name, tool_action, details, result_preview, now.clone());
            doc.last_update = now;
            Ok(())
        })?
    }

    async fn transition_to_phase(&self, process_id: &str, phase: &str, step: &str) -> Result<(), StorageError> {
        let _permit = self.acquire_write().await?;
        let now = self.now();
        let orchestration_agents = self.orchestration_agents.clone();
        self.with_process(process_id, move |doc| {
            doc.phase = phase.to_string();
            doc.step = step.to_string();
            for (name, agent) in doc.agents.iter_mut() {
                if !orchestration_agents.contains(name) {
                    agent.reset_for_new_step();
                }
            }
            doc.last_update = now;
        })
    }

    async fn record_step_result(
        &self,
        process_id: &str,
        step_name: &str,
        summary: StepResultSummary,
    ) -> Result<(), StorageError> {
        let _permit = self.acquire_write().await?;
        let now = self.now();
        self.with_process(process_id, move |doc| {
            doc.step_results.insert(step_name.to_string(), summary);
            doc.last_update = now;
        })
    }

    async fn record_final_outcome(&self, process_id: &str, outcome: FinalOutcome) -> Result<(), StorageError> {
        let _permit = self.acquire_write().await?;
        let now = self.now();
        self.with_process(process_id, move |doc| {
            if let Some(files) = outcome.details.get("generated_files").and_then(|v| v.as_array()) {
                doc.generated_files = files
                    .iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect();
            }
            if let Some(metrics) = outcome.details.get("conversion_metrics").and_then(|v| v.as_object()) {
                doc.conversion_metrics = metrics.clone().into_iter().collect();
            }
            doc.mark_completed(outcome, now);
        })
    }

    async fn record_failure_outcome(
        &self,
        process_id: &str,
        error: &str,
        failed_step: Option<String>,
        details: Option<String>,
    ) -> Result<(), StorageError> {
        let _permit = self.acquire_write().await?;
        let now = self.now();
        self.with_process(process_id, move |doc| {
            doc.mark_failed(error, details, failed_step, None, None, now);
        })
    }

    async fn get_final_outcome(&self, process_id: &str) -> Result<Option<FinalOutcome>, StorageError> {
        let _permit = self.acquire_read().await?;
        let documents = self.documents.lock();
        Ok(documents.get(process_id).and_then(|d| d.final_outcome.clone()))
    }

    async fn get_process(&self, process_id: &str) -> Result<Option<ProcessStatus>, StorageError> {
        let _permit = self.acquire_read().await?;
        let documents = self.documents.lock();
        Ok(documents.get(process_id).cloned())
    }

    async fn snapshot(&self) -> Result<Vec<ProcessStatus>, StorageError> {
        let _permit = self.acquire_read().await?;
        Ok(self.documents.lock().values().cloned().collect())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
