// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry Policy (spec §4.3): capped exponential backoff with jitter, plus
//! the requeue/dead-letter decision table.

use migr_core::{ErrorKind, RetryDecision};
use parking_lot::Mutex;
use std::sync::Arc;

/// Tunable parameters, defaults grounded on
/// `original_source/src/processor/src/services/retry_manager.py`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicyConfig {
    pub max_attempts: u32,
    pub base_delay_seconds: f64,
    pub max_delay_seconds: f64,
    pub jitter_fraction: f64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_seconds: 30.0,
            max_delay_seconds: 300.0,
            jitter_fraction: 0.1,
            backoff_multiplier: 2.0,
        }
    }
}

/// Cumulative counters the policy maintains across the process lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryMetrics {
    pub total_attempts: u64,
    pub successful_retries: u64,
    pub failed_retries: u64,
    pub max_retries_exceeded: u64,
    pub total_retry_time_seconds: f64,
}

#[derive(Clone)]
pub struct RetryPolicy {
    config: RetryPolicyConfig,
    metrics: Arc<Mutex<RetryMetrics>>,
}

impl RetryPolicy {
    pub fn new(config: RetryPolicyConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(Mutex::new(RetryMetrics::default())),
        }
    }

    pub fn config(&self) -> RetryPolicyConfig {
        self.config
    }

    pub fn metrics(&self) -> RetryMetrics {
        *self.metrics.lock()
    }

    /// `delay(n) = min(base_delay * multiplier^n, max_delay)`, then symmetric
    /// jitter, floored at 1 second. `jitter_sample` is a caller-supplied draw
    /// from `uniform(-1, 1)` so the formula is deterministically testable;
    /// production callers pass `rand::random::<f64>() * 2.0 - 1.0`.
    pub fn delay_seconds(&self, attempt_number: u32, jitter_sample: f64) -> f64 {
        let exponential = self.config.base_delay_seconds
            * self.config.backoff_multiplier.powi(attempt_number as i32);
        let capped = exponential.min(self.config.max_delay_seconds);
        let jitter = capped * self.config.jitter_fraction * jitter_sample;
        (capped + jitter).max(1.0)
    }

    /// Draws fresh jitter via `rand` and returns the final delay, in whole seconds.
    pub fn next_delay_seconds(&self, attempt_number: u32) -> u64 {
        let sample = rand::random::<f64>() * 2.0 - 1.0;
        self.delay_seconds(attempt_number, sample).round() as u64
    }

    /// Decision table from spec §4.3. `requires_immediate_retry` and
    /// `dequeue_count` come from the step/queue layer; `failure_reason` is
    /// the step's own reason text, echoed verbatim into dead-letter reasons
    /// (spec §8, scenario C: `"Non-retryable error: hard termination: blocked"`).
    pub fn decide(
        &self,
        requires_immediate_retry: bool,
        classification: ErrorKind,
        dequeue_count: u32,
        failure_reason: &str,
    ) -> RetryDecision {
        self.metrics.lock().total_attempts += 1;

        if classification == ErrorKind::Poison {
            return RetryDecision::dead_letter("poison_message");
        }

        if requires_immediate_retry && dequeue_count < self.config.max_attempts {
            self.metrics.lock().successful_retries += 1;
            return RetryDecision::requeue_immediate("step requested immediate retry");
        }

        if classification == ErrorKind::Retryable && dequeue_count < self.config.max_attempts {
            let delay = self.next_delay_seconds(dequeue_count);
            self.metrics.lock().successful_retries += 1;
            self.metrics.lock().total_retry_time_seconds += delay as f64;
            return RetryDecision::requeue_backoff(delay, "retryable error, backing off");
        }

        if dequeue_count >= self.config.max_attempts {
            self.metrics.lock().max_retries_exceeded += 1;
            self.metrics.lock().failed_retries += 1;
            return RetryDecision::dead_letter(format!(
                "Max retries ({}) exceeded",
                self.config.max_attempts
            ));
        }

        self.metrics.lock().failed_retries += 1;
        RetryDecision::dead_letter(format!("Non-retryable error: {failure_reason}"))
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
