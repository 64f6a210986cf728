//! Per-key reference counts for one binder configuration.
//!
//! A key is present in the table iff its count is positive: incrementing
//! from zero inserts it, decrementing to zero removes it. Nothing here
//! dispatches or reads the store; the binder turns the zero-crossing
//! return value into its cleanup decision.
//!
//! Underflow (decrementing a key that is not tracked) is a lifecycle
//! contract violation by the caller, the double-detach class. Debug
//! builds fail fast on it; release builds return the negative transient
//! and leave the key absent, never storing a non-positive count.

use crate::key::SliceKey;
use hashbrown::HashMap;

#[derive(Debug, Default)]
pub struct RefCounter {
    counts: HashMap<SliceKey, usize>,
}

impl RefCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one reference to `key`, returning the new count.
    pub fn incr(&mut self, key: &SliceKey) -> isize {
        self.incr_by(key, 1)
    }

    /// Add `delta` references to `key` (absent counts as zero) and return
    /// the arithmetic result. A result of zero evicts the key; a negative
    /// result is returned but never stored.
    pub fn incr_by(&mut self, key: &SliceKey, delta: isize) -> isize {
        let current = self.counts.get(key.as_str()).copied().unwrap_or(0) as isize;
        let next = current + delta;
        debug_assert!(next >= 0, "reference count underflow for key {key}");
        if next > 0 {
            self.counts.insert(key.clone(), next as usize);
        } else {
            self.counts.remove(key.as_str());
        }
        next
    }

    /// Drop one reference from `key`, returning the new count.
    pub fn decr(&mut self, key: &SliceKey) -> isize {
        self.incr_by(key, -1)
    }

    /// Drop `delta` references from `key`.
    pub fn decr_by(&mut self, key: &SliceKey, delta: isize) -> isize {
        self.incr_by(key, -delta)
    }

    /// Current count for `key`; zero when untracked.
    pub fn count(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.counts.contains_key(key)
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
