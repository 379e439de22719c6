use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use parking_lot::RwLock;

/// Shared call counters and timings, keyed by logical operation name
///
/// The one piece of deliberately shared mutable state across concurrent
/// calls; updates are atomic per key.
#[derive(Default)]
pub struct MetricsRegistry {
    counters: RwLock<HashMap<String, Arc<AtomicU64>>>,
    /// Accumulated call time per key, in microseconds
    durations: RwLock<HashMap<String, Arc<AtomicU64>>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumps the counter for `key`, returning the new total
    pub fn increment(&self, key: &str) -> u64 {
        let counter = Self::cell(&self.counters, key);
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_duration(&self, key: &str, duration: Duration) {
        let cell = Self::cell(&self.durations, key);
        cell.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn count(&self, key: &str) -> u64 {
        self.counters
            .read()
            .get(key)
            .map(|counter| counter.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn total_duration(&self, key: &str) -> Duration {
        let micros = self
            .durations
            .read()
            .get(key)
            .map(|cell| cell.load(Ordering::Relaxed))
            .unwrap_or(0);
        Duration::from_micros(micros)
    }

    /// Counter snapshot, sorted by key for stable output
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> = self
            .counters
            .read()
            .iter()
            .map(|(key, counter)| (key.clone(), counter.load(Ordering::Relaxed)))
            .collect();
        entries.sort();
        entries
    }

    fn cell(map: &RwLock<HashMap<String, Arc<AtomicU64>>>, key: &str) -> Arc<AtomicU64> {
        if let Some(cell) = map.read().get(key) {
            return cell.clone();
        }
        map.write().entry(key.to_string()).or_default().clone()
    }
}
