// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the Step Driver.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("telemetry store error: {0}")]
    Storage(#[from] migr_storage::StorageError),
    #[error("step '{step}' succeeded but left required field(s) empty: {missing}")]
    IncompleteStepPayload { step: String, missing: String },
    #[error("pipeline has no steps configured")]
    EmptyPipeline,
}
