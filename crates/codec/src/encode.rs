// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Encoding a `MigrationRequest` back to canonical-form JSON (never base64),
//! so the round-trip property in spec §8.1 is expressible.

use crate::wire::{WireMessage, WireMigrationRequest};
use migr_core::{MigrationRequest, Priority};

pub fn encode(request: &MigrationRequest) -> Vec<u8> {
    let wire = WireMessage {
        process_id: Some(request.process_id.clone()),
        user_id: Some(request.user_id.clone()),
        migration_request: Some(WireMigrationRequest {
            process_id: Some(request.process_id.clone()),
            user_id: Some(request.user_id.clone()),
            container_name: Some(request.container_name.clone()),
            source_file_folder: Some(request.source_folder.clone()),
            workspace_file_folder: Some(request.workspace_folder.clone()),
            output_file_folder: Some(request.output_folder.clone()),
        }),
        retry_count: Some(0),
        created_time: Some(request.created_at.clone()),
        priority: Some(match request.priority {
            Priority::Normal => "normal".to_string(),
            Priority::High => "high".to_string(),
        }),
    };
    serde_json::to_vec(&wire).unwrap_or_default()
}

#[cfg(test)]
#[path = "encode_tests.rs"]
mod tests;
