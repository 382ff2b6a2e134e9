// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service configuration, loaded from the environment variables spec §6
//! lists. Grounded on `oj_daemon::lifecycle::Config::load`'s pattern: one
//! loader function, documented defaults for every tunable, a dedicated
//! error type distinguishing "missing required config" from other startup
//! failures.

use crate::error::ServiceError;
use std::time::Duration;

const DEFAULT_QUEUE_NAME: &str = "migration-requests";
const DEFAULT_DEAD_LETTER_QUEUE_NAME: &str = "migration-requests-dlq";
const DEFAULT_VISIBILITY_TIMEOUT_MINUTES: u64 = 5;
const DEFAULT_MAX_RETRY_COUNT: u32 = 5;
const DEFAULT_CONCURRENT_WORKERS: usize = 4;
const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 5;
const DEFAULT_MESSAGE_TIMEOUT_MINUTES: u64 = 30;
const DEFAULT_SHUTDOWN_GRACE_SECONDS: u64 = 2;

/// Resolved service configuration. `storage_account_name` /
/// `cosmos_db_endpoint` are required (spec §6); everything else is a
/// deployment tunable with a documented default.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage_account_name: Option<String>,
    pub azure_storage_connection_string: Option<String>,
    pub cosmos_db_endpoint: Option<String>,
    pub cosmos_db_key: Option<String>,
    pub cosmos_db_name: Option<String>,
    pub cosmos_container_name: Option<String>,
    pub allow_retries: bool,
    pub azure_region: Option<String>,
    pub azure_client_id: Option<String>,

    pub queue_name: String,
    pub dead_letter_queue_name: String,
    pub visibility_timeout: Duration,
    pub max_retry_count: u32,
    pub concurrent_workers: usize,
    pub poll_interval: Duration,
    pub message_timeout: Duration,
    pub shutdown_grace_period: Duration,
}

impl Config {
    /// Reads the environment per spec §6. A missing `STORAGE_ACCOUNT_NAME`
    /// (without an `AZURE_STORAGE_CONNECTION_STRING` fallback) or a missing
    /// `COSMOS_DB_ENDPOINT` is a `ServiceError::MissingConfig`, surfaced by
    /// `main` as process exit code 1.
    pub fn load() -> Result<Self, ServiceError> {
        let storage_account_name = env_opt("STORAGE_ACCOUNT_NAME");
        let azure_storage_connection_string = env_opt("AZURE_STORAGE_CONNECTION_STRING");
        if storage_account_name.is_none() && azure_storage_connection_string.is_none() {
            return Err(ServiceError::MissingConfig(
                "STORAGE_ACCOUNT_NAME or AZURE_STORAGE_CONNECTION_STRING".to_string(),
            ));
        }

        let cosmos_db_endpoint = env_opt("COSMOS_DB_ENDPOINT");
        if cosmos_db_endpoint.is_none() {
            return Err(ServiceError::MissingConfig("COSMOS_DB_ENDPOINT".to_string()));
        }

        let allow_retries = env_opt("ALLOW_RETRIES")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        Ok(Self {
            storage_account_name,
            azure_storage_connection_string,
            cosmos_db_endpoint,
            cosmos_db_key: env_opt("COSMOS_DB_KEY"),
            cosmos_db_name: env_opt("RAI_COSMOS_DB_NAME"),
            cosmos_container_name: env_opt("RAI_COSMOS_CONTAINER_NAME"),
            allow_retries,
            azure_region: env_opt("AZURE_REGION"),
            azure_client_id: env_opt("AZURE_CLIENT_ID"),

            queue_name: env_opt("MIGR_QUEUE_NAME").unwrap_or_else(|| DEFAULT_QUEUE_NAME.to_string()),
            dead_letter_queue_name: env_opt("MIGR_DEAD_LETTER_QUEUE_NAME")
                .unwrap_or_else(|| DEFAULT_DEAD_LETTER_QUEUE_NAME.to_string()),
            visibility_timeout: Duration::from_secs(
                env_u64("MIGR_VISIBILITY_TIMEOUT_MINUTES", DEFAULT_VISIBILITY_TIMEOUT_MINUTES) * 60,
            ),
            max_retry_count: env_u32("MIGR_MAX_RETRY_COUNT", DEFAULT_MAX_RETRY_COUNT),
            concurrent_workers: env_u64("MIGR_CONCURRENT_WORKERS", DEFAULT_CONCURRENT_WORKERS as u64) as usize,
            poll_interval: Duration::from_secs(env_u64(
                "MIGR_POLL_INTERVAL_SECONDS",
                DEFAULT_POLL_INTERVAL_SECONDS,
            )),
            message_timeout: Duration::from_secs(
                env_u64("MIGR_MESSAGE_TIMEOUT_MINUTES", DEFAULT_MESSAGE_TIMEOUT_MINUTES) * 60,
            ),
            shutdown_grace_period: Duration::from_secs(env_u64(
                "MIGR_SHUTDOWN_GRACE_SECONDS",
                DEFAULT_SHUTDOWN_GRACE_SECONDS,
            )),
        })
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
