// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service-level errors, grounded on `oj_daemon::lifecycle::LifecycleError`'s
//! convention of distinguishing startup failures (exit code 1, spec §6)
//! from steady-state errors (logged, never fatal to the process).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("missing required configuration: {0}")]
    MissingConfig(String),
    #[error("telemetry store error: {0}")]
    Storage(#[from] migr_storage::StorageError),
    #[error("pipeline engine error: {0}")]
    Engine(#[from] migr_engine::EngineError),
}

impl ServiceError {
    /// The process exit code a `main` should use for this error, per spec §6:
    /// `0` on clean shutdown, `1` on startup failure (missing config,
    /// unreachable queue or telemetry store).
    pub fn exit_code(&self) -> i32 {
        match self {
            ServiceError::MissingConfig(_) => 1,
            ServiceError::Storage(_) | ServiceError::Engine(_) => 1,
        }
    }
}
