//! Per-key trailing-edge debouncing.
//!
//! [`DebounceScheduler`] holds at most one pending entry per key. Scheduling
//! a key that is already pending replaces its payload and pushes its deadline
//! out, so a burst of events inside the window produces exactly one fire,
//! after the last event.
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use formcheck_runtime::debounce::DebounceScheduler;
//!
//! let mut d = DebounceScheduler::new();
//! let window = Duration::from_millis(500);
//!
//! d.schedule("username", (), window, Duration::from_millis(0));
//! d.schedule("username", (), window, Duration::from_millis(200));
//! assert!(d.poll(Duration::from_millis(600)).is_empty());
//!
//! let fired = d.poll(Duration::from_millis(700));
//! assert_eq!(fired, vec![("username", ())]);
//! ```
//!
//! # Invariants
//!
//! - **One pending entry per key**: a reschedule supersedes, never stacks.
//! - **Trailing edge**: an entry fires once `now >= last schedule + delay`.
//! - **Deterministic order**: `poll` yields entries by deadline, ties broken by
//!   scheduling order.

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Pending<T> {
    payload: T,
    deadline: Duration,
    seq: u64,
}

/// Counters for a [`DebounceScheduler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceStats {
    /// Calls to `schedule`.
    pub scheduled: u64,
    /// Schedules that replaced a pending entry.
    pub superseded: u64,
    /// Entries returned by `poll`.
    pub fired: u64,
    /// Entries removed by `cancel` or `clear`.
    pub cancelled: u64,
}

/// Trailing-edge coalescer keyed by `K`.
#[derive(Debug, Clone)]
pub struct DebounceScheduler<K, T = ()> {
    pending: HashMap<K, Pending<T>>,
    next_seq: u64,
    stats: DebounceStats,
}

impl<K, T> Default for DebounceScheduler<K, T> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
            next_seq: 0,
            stats: DebounceStats::default(),
        }
    }
}

impl<K: Eq + Hash + Clone, T> DebounceScheduler<K, T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` for `key` to fire at `now + delay`.
    ///
    /// Returns `true` if a pending entry for `key` was superseded.
    pub fn schedule(&mut self, key: K, payload: T, delay: Duration, now: Duration) -> bool {
        self.stats.scheduled += 1;
        let seq = self.next_seq;
        self.next_seq += 1;
        let entry = Pending {
            payload,
            deadline: now.saturating_add(delay),
            seq,
        };
        let superseded = self.pending.insert(key, entry).is_some();
        if superseded {
            self.stats.superseded += 1;
        }
        superseded
    }

    /// Remove and return every entry whose deadline is at or before `now`.
    pub fn poll(&mut self, now: Duration) -> Vec<(K, T)> {
        let mut due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(k, _)| k.clone())
            .collect();
        if due.is_empty() {
            return Vec::new();
        }
        due.sort_by_key(|k| {
            self.pending
                .get(k)
                .map_or((Duration::MAX, u64::MAX), |p| (p.deadline, p.seq))
        });

        let fired: Vec<(K, T)> = due
            .into_iter()
            .filter_map(|k| self.pending.remove(&k).map(|p| (k, p.payload)))
            .collect();
        self.stats.fired += fired.len() as u64;
        fired
    }

    /// Drop the pending entry for `key`. Returns `true` if one existed.
    pub fn cancel(&mut self, key: &K) -> bool {
        let removed = self.pending.remove(key).is_some();
        if removed {
            self.stats.cancelled += 1;
        }
        removed
    }

    /// Drop every pending entry.
    pub fn clear(&mut self) {
        self.stats.cancelled += self.pending.len() as u64;
        self.pending.clear();
    }

    #[must_use]
    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// Deadline of the pending entry for `key`.
    #[must_use]
    pub fn deadline_of(&self, key: &K) -> Option<Duration> {
        self.pending.get(key).map(|p| p.deadline)
    }

    /// The earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.values().map(|p| p.deadline).min()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> DebounceStats {
        self.stats
    }
}
