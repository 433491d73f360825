//! Per-rule replacement counters
//!
//! [`Stats`] is safe to share between threads (wrap it in an `Arc`) so
//! several engines can report into one sink.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

/// Replacement counts keyed by rule name
#[derive(Debug, Default)]
pub struct Stats {
    counts: Mutex<HashMap<String, u64>>,
}

impl Stats {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `n` replacements to `rule`; zero is ignored
    pub fn inc(&self, rule: &str, n: u64) {
        if n == 0 {
            return;
        }
        let mut counts = self.lock();
        match counts.get_mut(rule) {
            Some(count) => *count += n,
            None => {
                counts.insert(rule.to_string(), n);
            }
        }
    }

    /// Count recorded for `rule` so far
    pub fn get(&self, rule: &str) -> u64 {
        self.lock().get(rule).copied().unwrap_or(0)
    }

    /// Point-in-time copy, ordered by rule name
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.lock()
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect()
    }

    // Counters stay consistent under poisoning
    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.counts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
