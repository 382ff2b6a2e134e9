// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy shared by the Error Classifier (`migr-policy`), Step
//! Driver, and Failure Collector (`migr-engine`).

use serde::{Deserialize, Serialize};

/// Output domain of the Error Classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transient infrastructure fault: network, throttle, 5xx, timeout.
    Retryable,
    /// Deterministic error: bad config, auth, validation, prompt-contract violation.
    NonRetryable,
    /// Malformed queue payload.
    Poison,
    /// Identified non-critical upstream hiccup that must not tear down the pipeline.
    Ignorable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Retryable => "retryable",
            ErrorKind::NonRetryable => "non_retryable",
            ErrorKind::Poison => "poison",
            ErrorKind::Ignorable => "ignorable",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
