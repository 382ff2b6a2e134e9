// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `MigrationRequest`: the normalized payload a queue message carries.

use serde::{Deserialize, Serialize};

/// Advisory scheduling priority. Not consulted by the core (FIFO-with-retry
/// only, per the Non-goals); carried so external producers can express intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    High,
}

/// An immutable, fully-normalized migration job description.
///
/// Produced only by the Message Codec (`migr-codec`); every field is
/// guaranteed non-empty except `user_id`, which the source allows blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRequest {
    pub process_id: String,
    pub user_id: String,
    pub container_name: String,
    pub source_folder: String,
    pub workspace_folder: String,
    pub output_folder: String,
    pub priority: Priority,
    pub created_at: String,
}

impl MigrationRequest {
    /// The mandatory fields that must be non-empty for a request to be valid.
    /// `user_id` is intentionally excluded (the source allows an anonymous caller).
    pub fn mandatory_fields_present(&self) -> bool {
        !self.process_id.is_empty()
            && !self.container_name.is_empty()
            && !self.source_folder.is_empty()
            && !self.workspace_folder.is_empty()
            && !self.output_folder.is_empty()
            && !self.created_at.is_empty()
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
