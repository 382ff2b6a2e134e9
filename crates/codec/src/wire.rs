// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-format shapes accepted from the queue, per spec §6.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTAINER_NAME: &str = "processes";
pub const DEFAULT_SOURCE_SUBFOLDER: &str = "source";
pub const DEFAULT_WORKSPACE_SUBFOLDER: &str = "workspace";
pub const DEFAULT_OUTPUT_SUBFOLDER: &str = "converted";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireMigrationRequest {
    pub process_id: Option<String>,
    pub user_id: Option<String>,
    pub container_name: Option<String>,
    pub source_file_folder: Option<String>,
    pub workspace_file_folder: Option<String>,
    pub output_file_folder: Option<String>,
}

/// The canonical top-level shape; every key here is recognized, unknown
/// top-level keys are dropped silently (spec §4.1 step 4). `#[serde(default)]`
/// on every field means this struct never fails to deserialize a JSON object
/// — validation happens afterward, in `decode`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub process_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub migration_request: Option<WireMigrationRequest>,
    #[serde(default)]
    pub retry_count: Option<u32>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}
