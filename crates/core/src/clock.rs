// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so timing-sensitive code can be driven deterministically in tests.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time, expressed as milliseconds since the Unix epoch.
///
/// Implementors must be cheap to clone and safe to share across worker tasks.
pub trait Clock: Clone + Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn epoch_ms(&self) -> i64;

    /// Current time as an ISO-8601 / RFC-3339 string (UTC).
    fn now_iso8601(&self) -> String {
        let millis = self.epoch_ms();
        let secs = millis.div_euclid(1000);
        let nanos = (millis.rem_euclid(1000) * 1_000_000) as u32;
        chrono::DateTime::<chrono::Utc>::from_timestamp(secs, nanos)
            .unwrap_or_else(|| chrono::DateTime::<chrono::Utc>::from_timestamp(0, 0).unwrap())
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }
}

/// Wall-clock `Clock` backed by `SystemTime`.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Deterministic, manually-advanced `Clock` for tests.
#[derive(Clone)]
pub struct FakeClock {
    millis: Arc<AtomicI64>,
    // guards compound read-advance-read sequences used by tests that assert ordering
    advance_lock: Arc<Mutex<()>>,
}

impl FakeClock {
    pub fn new(start_epoch_ms: i64) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start_epoch_ms)),
            advance_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Advances the clock by `delta_ms` and returns the new epoch time.
    pub fn advance_ms(&self, delta_ms: i64) -> i64 {
        let _guard = self.advance_lock.lock();
        self.millis.fetch_add(delta_ms, Ordering::SeqCst) + delta_ms
    }

    pub fn set_epoch_ms(&self, epoch_ms: i64) {
        self.millis.store(epoch_ms, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
