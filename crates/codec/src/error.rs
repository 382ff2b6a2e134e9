// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the Message Codec.

use thiserror::Error;

/// A raw queue payload that cannot be turned into a `MigrationRequest`.
///
/// Every variant is terminal: the Queue Service routes any `CodecError` to
/// the dead-letter queue with `is_poison_message = true` (spec §4.1, §4.7).
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("empty message payload")]
    EmptyPayload,
    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(String),
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("message missing required field: {0}")]
    MissingField(String),
}
