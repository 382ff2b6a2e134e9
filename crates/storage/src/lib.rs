// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Telemetry Store (spec §4.4): the document-store abstraction the service
//! uses to track per-process agent activity, step results, and final
//! outcomes.

mod error;
mod store;

pub use error::StorageError;
pub use store::{
    InMemoryTelemetryStore, TelemetryStore, DEFAULT_MAX_CONCURRENT_READS,
    DEFAULT_MAX_CONCURRENT_WRITES,
};
