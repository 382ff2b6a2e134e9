// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error Classifier (spec §4.2): maps a raised failure to `ErrorKind`.

use migr_core::ErrorKind;

/// Configurable substring allowlists. Defaults mirror
/// `original_source/src/processor/src/utils/error_classifier.py`.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Global retry kill-switch (`ALLOW_RETRIES` in the original).
    pub allow_retries: bool,
    pub ignorable_markers: Vec<String>,
    pub retryable_markers: Vec<String>,
    pub non_retryable_markers: Vec<String>,
    pub hard_termination_markers: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            allow_retries: true,
            ignorable_markers: [
                "service failed to comp",
                "azurechatcompletion",
                "azure_chat_completion",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            retryable_markers: [
                "timeout",
                "timed out",
                "request timeout",
                "connection timeout",
                "read timeout",
                "504",
                "502",
                "503",
                "rate limit",
                "too many requests",
                "429",
                "throttle",
                "quota",
                "service unavailable",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            non_retryable_markers: [
                "auth",
                "permission",
                "credential",
                "agents failed to provide required termination structure",
                "agent prompt compliance",
                "json format requirements",
                "termination structure",
                "agents must provide:",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            hard_termination_markers: [
                "hard_terminated",
                "hard termination",
                "connection reset",
                "connection refused",
                "network unreachable",
                "dns resolution failed",
                "socket timeout",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Descriptor the classifier reasons about. Callers (typically the Step
/// Driver / Failure Collector) translate whatever error type they hold into
/// this shape rather than the classifier reaching into arbitrary `dyn Error`.
#[derive(Debug, Clone, Default)]
pub struct ClassifyInput {
    pub message: String,
    pub type_name: String,
    /// Honors an explicit classification carried by the error itself
    /// (spec §4.2 rule 1).
    pub explicit: Option<ErrorKind>,
    pub is_timeout: bool,
    pub is_network_error: bool,
}

impl ClassifyInput {
    pub fn new(message: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    fn haystack(&self) -> String {
        format!("{} {}", self.message, self.type_name).to_lowercase()
    }
}

/// The classifier's verdict, with the reason it reports to telemetry.
#[derive(Debug, Clone)]
pub struct ClassifyDecision {
    pub kind: ErrorKind,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ErrorClassifier {
    config: ClassifierConfig,
}

impl ErrorClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Rule order (first match wins), exactly spec §4.2's seven steps.
    pub fn classify(&self, input: &ClassifyInput) -> ClassifyDecision {
        if let Some(kind) = input.explicit {
            return ClassifyDecision {
                kind,
                reason: "explicit classification attribute".to_string(),
            };
        }

        if !self.config.allow_retries {
            return ClassifyDecision {
                kind: ErrorKind::NonRetryable,
                reason: "retries disabled (ALLOW_RETRIES=false)".to_string(),
            };
        }

        let haystack = input.haystack();

        if let Some(marker) = find_marker(&haystack, &self.config.ignorable_markers) {
            return ClassifyDecision {
                kind: ErrorKind::Ignorable,
                reason: format!("matched ignorable marker: {marker}"),
            };
        }

        if input.is_timeout || input.is_network_error {
            return ClassifyDecision {
                kind: ErrorKind::Retryable,
                reason: "network/OS/timeout error".to_string(),
            };
        }
        if let Some(marker) = find_marker(&haystack, &self.config.retryable_markers) {
            return ClassifyDecision {
                kind: ErrorKind::Retryable,
                reason: format!("matched retryable marker: {marker}"),
            };
        }

        if let Some(marker) = find_marker(&haystack, &self.config.non_retryable_markers) {
            return ClassifyDecision {
                kind: ErrorKind::NonRetryable,
                reason: format!("matched non-retryable marker: {marker}"),
            };
        }

        if let Some(marker) = find_marker(&haystack, &self.config.hard_termination_markers) {
            return ClassifyDecision {
                kind: ErrorKind::Retryable,
                reason: format!("matched hard-termination marker: {marker}"),
            };
        }

        ClassifyDecision {
            kind: ErrorKind::Retryable,
            reason: "default: unclassified error treated as retryable".to_string(),
        }
    }
}

fn find_marker<'a>(haystack: &str, markers: &'a [String]) -> Option<&'a str> {
    markers.iter().find(|m| haystack.contains(m.as_str())).map(|s| s.as_str())
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
