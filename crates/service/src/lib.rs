// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! migr-service: the `migrd` daemon — configuration, the four-step pipeline
//! adapter, and the queue-driven worker loop (spec §4.6, §4.7, §6).

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod queue_service;
pub mod worker;

pub use config::Config;
pub use error::ServiceError;
pub use pipeline::{build_pipeline, OrchestratedStep, STEP_NAMES};
pub use queue_service::QueueService;
pub use worker::Worker;
