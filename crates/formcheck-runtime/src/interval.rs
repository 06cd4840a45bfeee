#![forbid(unsafe_code)]

//! Fixed-rate recurring tasks on a host-driven clock.

use std::time::Duration;

/// A task that is due every `interval` while running.
///
/// The task does not own a timer; the caller polls it with the current time.
/// Missed periods are not replayed: a poll long after the deadline fires once
/// and schedules the next deadline one interval after `now`.
#[derive(Debug, Clone)]
pub struct RecurringTask {
    interval: Duration,
    next_due: Option<Duration>,
    fired: u64,
}

impl RecurringTask {
    /// A stopped task. A zero interval never fires.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
            fired: 0,
        }
    }

    /// Start (or restart) the task, first due at `now + interval`.
    pub fn start(&mut self, now: Duration) {
        if self.interval.is_zero() {
            self.next_due = None;
            return;
        }
        self.next_due = Some(now.saturating_add(self.interval));
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns `true` once per elapsed period.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.fired += 1;
                self.next_due = Some(now.saturating_add(self.interval));
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.next_due
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of times the task has fired.
    #[must_use]
    pub fn fired(&self) -> u64 {
        self.fired
    }
}
