#![forbid(unsafe_code)]

//! Monotonic time sources.
//!
//! Every deadline in the runtime (debounced validation, autosave, the submit
//! delay) is held against a [`Clock`]. Production code uses [`SystemClock`];
//! tests and host-driven embeddings use [`ManualClock`] and move time
//! explicitly.

use std::time::Duration;

use web_time::Instant;

/// A monotonic clock measured from an arbitrary epoch.
pub trait Clock {
    /// Time elapsed since the clock's epoch.
    fn now_mono(&self) -> Duration;
}

/// Wall-clock monotonic time.
///
/// Backed by `web_time::Instant`, so it works on `wasm32-unknown-unknown`
/// as well as native targets.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_mono(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Deterministic clock controlled by the caller.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set the current time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

impl Clock for ManualClock {
    fn now_mono(&self) -> Duration {
        self.now
    }
}
