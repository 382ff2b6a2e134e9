// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decoding a raw queue payload into a `MigrationRequest` (spec §4.1).

use crate::error::CodecError;
use crate::wire::{
    WireMessage, DEFAULT_CONTAINER_NAME, DEFAULT_OUTPUT_SUBFOLDER, DEFAULT_SOURCE_SUBFOLDER,
    DEFAULT_WORKSPACE_SUBFOLDER,
};
use base64::Engine as _;
use migr_core::{Clock, MigrationRequest, Priority};

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &[
    "process_id",
    "migration_request",
    "user_id",
    "retry_count",
    "created_time",
    "priority",
];

/// Decodes queue payloads into `MigrationRequest`s, per the algorithm in spec §4.1.
///
/// Holds a `Clock` so short-form messages (which carry no `created_time`) get
/// a `created_at` stamp without the codec reaching for global state.
#[derive(Clone)]
pub struct MessageCodec<C: Clock> {
    clock: C,
}

impl<C: Clock> MessageCodec<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn decode(&self, raw_payload: &[u8]) -> Result<MigrationRequest, CodecError> {
        if raw_payload.is_empty() {
            return Err(CodecError::EmptyPayload);
        }

        let text = std::str::from_utf8(raw_payload)
            .map_err(|e| CodecError::InvalidUtf8(e.to_string()))?;

        let json_text = if looks_like_base64(text) {
            match base64::engine::general_purpose::STANDARD.decode(text) {
                Ok(decoded) => match String::from_utf8(decoded) {
                    Ok(decoded_text) => decoded_text,
                    Err(_) => text.to_string(),
                },
                Err(_) => text.to_string(),
            }
        } else {
            text.to_string()
        };

        let value: serde_json::Value =
            serde_json::from_str(&json_text).map_err(|e| CodecError::InvalidJson(e.to_string()))?;

        let obj = value.as_object().ok_or(CodecError::NotAnObject)?;
        for key in obj.keys() {
            if !KNOWN_TOP_LEVEL_KEYS.contains(&key.as_str()) {
                tracing::debug!(key = %key, "dropping unrecognized top-level field");
            }
        }

        let wire: WireMessage =
            serde_json::from_value(value).map_err(|e| CodecError::InvalidJson(e.to_string()))?;

        self.normalize(wire)
    }

    /// Synthesizes a canonical `MigrationRequest` from whichever wire shape
    /// was supplied, filling in defaults for a short-form message.
    fn normalize(&self, wire: WireMessage) -> Result<MigrationRequest, CodecError> {
        let process_id = wire
            .process_id
            .clone()
            .or_else(|| wire.migration_request.as_ref().and_then(|r| r.process_id.clone()))
            .ok_or_else(|| CodecError::MissingField("process_id".into()))?;
        if process_id.is_empty() {
            return Err(CodecError::MissingField("process_id".into()));
        }

        let user_id = wire
            .user_id
            .or_else(|| wire.migration_request.as_ref().and_then(|r| r.user_id.clone()))
            .unwrap_or_default();

        let mr = wire.migration_request.unwrap_or_default();

        let container_name = mr
            .container_name
            .unwrap_or_else(|| DEFAULT_CONTAINER_NAME.to_string());
        let source_folder = mr
            .source_file_folder
            .unwrap_or_else(|| format!("{process_id}/{DEFAULT_SOURCE_SUBFOLDER}"));
        let workspace_folder = mr
            .workspace_file_folder
            .unwrap_or_else(|| format!("{process_id}/{DEFAULT_WORKSPACE_SUBFOLDER}"));
        let output_folder = mr
            .output_file_folder
            .unwrap_or_else(|| format!("{process_id}/{DEFAULT_OUTPUT_SUBFOLDER}"));

        let priority = match wire.priority.as_deref() {
            Some("high") => Priority::High,
            _ => Priority::Normal,
        };

        let created_at = wire.created_time.unwrap_or_else(|| self.clock.now_iso8601());

        let request = MigrationRequest {
            process_id,
            user_id,
            container_name,
            source_folder,
            workspace_folder,
            output_folder,
            priority,
            created_at,
        };

        if !request.mandatory_fields_present() {
            return Err(CodecError::MissingField("mandatory folder field".into()));
        }

        Ok(request)
    }
}

/// Strict base64 syntax check: every character in the base64 alphabet,
/// length a multiple of 4. JSON text (which always contains `{`, `"`, `:`)
/// never satisfies this, so plain JSON payloads fall through untouched.
fn looks_like_base64(s: &str) -> bool {
    let trimmed = s.trim_end();
    if trimmed.is_empty() || trimmed.len() % 4 != 0 {
        return false;
    }
    trimmed
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'=')
}

#[cfg(test)]
#[path = "decode_tests.rs"]
mod tests;
