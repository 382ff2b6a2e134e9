// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Step contract (§4.5), Step Driver (§4.6), Failure Collector (§4.8), and
//! Report Model (§4.9).

mod driver;
mod error;
#[cfg(feature = "test-support")]
mod fake;
mod failure_collector;
mod outcome;
mod report;
mod step;

pub use driver::{PipelineReport, StepDriver};
pub use error::EngineError;
#[cfg(feature = "test-support")]
pub use fake::FakeStep;
pub use failure_collector::{classify_severity, FailureCollector, Severity};
pub use outcome::StepOutcome;
pub use report::{
    remediation_for, ExecutiveSummary, FailureAnalysis, MigrationReport, RecurrenceLikelihood,
    RemediationAction, StepDetail,
};
pub use step::{missing_required_fields, SharedStep, Step, StepContext};
