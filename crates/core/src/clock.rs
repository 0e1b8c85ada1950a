// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling.

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A clock that provides the current wall-clock time, in milliseconds since
/// the Unix epoch. Abstracted so the policy monitor's restart-delay sleeps
/// and `start_time` stamping can be exercised deterministically in tests.
pub trait Clock: Clone + Send + Sync {
    fn epoch_ms(&self) -> u64;
}

/// Real system clock.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
    }
}

/// Fake clock for tests, with controllable time.
#[derive(Clone)]
pub struct FakeClock {
    epoch_ms: Arc<Mutex<u64>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self { epoch_ms: Arc::new(Mutex::new(1_700_000_000_000)) }
    }

    pub fn advance(&self, duration: Duration) {
        let mut guard = self.epoch_ms.lock().unwrap_or_else(|e| e.into_inner());
        *guard += duration.as_millis() as u64;
    }

    pub fn set_epoch_ms(&self, ms: u64) {
        let mut guard = self.epoch_ms.lock().unwrap_or_else(|e| e.into_inner());
        *guard = ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> u64 {
        *self.epoch_ms.lock().unwrap_or_else(|e| e.into_inner())
    }
}
