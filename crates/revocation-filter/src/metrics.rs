//! Metrics hooks for registry operations
//!
//! ## Usage
//!
//! ```
//! use revocation_filter::metrics::Metrics;
//! use std::time::Duration;
//!
//! let metrics = Metrics::new();
//! metrics.record_insert(Duration::from_micros(3), true, false);
//! metrics.record_lookup(Duration::from_micros(1), true);
//! assert_eq!(metrics.snapshot().inserts, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for registry operations
///
/// Thread-safe counters; one instance can be shared by several services.
#[derive(Default)]
pub struct Metrics {
    /// Filters built by `init_ledger`
    pub filters_initialized: AtomicU64,
    /// Successful inserts
    pub inserts: AtomicU64,
    /// Inserts rejected (invalid, duplicate or no room)
    pub insert_failures: AtomicU64,
    /// Inserts that needed an eviction to succeed
    pub relocations: AtomicU64,
    /// Lookups performed
    pub lookups: AtomicU64,
    /// Lookups that answered `true`
    pub lookups_positive: AtomicU64,
    /// Successful deletes
    pub deletes: AtomicU64,
    /// Deletes of items that were not present
    pub delete_misses: AtomicU64,
    /// Bytes written to the state store
    pub bytes_persisted: AtomicU64,
    /// Cumulative insert time in nanoseconds
    pub insert_time_ns: AtomicU64,
    /// Cumulative lookup time in nanoseconds
    pub lookup_time_ns: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a filter built from scratch
    pub fn record_filter_initialized(&self) {
        self.filters_initialized.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an insert attempt
    ///
    /// # Arguments
    /// * `duration` - Time spent in the filter
    /// * `inserted` - Whether the item was placed
    /// * `relocated` - Whether placement needed an eviction
    pub fn record_insert(&self, duration: Duration, inserted: bool, relocated: bool) {
        self.insert_time_ns.fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if !inserted {
            self.insert_failures.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.inserts.fetch_add(1, Ordering::Relaxed);
        if relocated {
            self.relocations.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a lookup
    pub fn record_lookup(&self, duration: Duration, found: bool) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.lookup_time_ns.fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        if found {
            self.lookups_positive.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a delete
    pub fn record_delete(&self, deleted: bool) {
        if deleted {
            self.deletes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.delete_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a state write
    pub fn record_persist(&self, bytes: usize) {
        self.bytes_persisted.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            filters_initialized: self.filters_initialized.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            insert_failures: self.insert_failures.load(Ordering::Relaxed),
            relocations: self.relocations.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            lookups_positive: self.lookups_positive.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            delete_misses: self.delete_misses.load(Ordering::Relaxed),
            bytes_persisted: self.bytes_persisted.load(Ordering::Relaxed),
            avg_insert_ns: self.avg_insert_time_ns(),
            avg_lookup_ns: self.avg_lookup_time_ns(),
        }
    }

    /// Average time per insert attempt, failures included
    pub fn avg_insert_time_ns(&self) -> u64 {
        let total = self.insert_time_ns.load(Ordering::Relaxed);
        let count = self.inserts.load(Ordering::Relaxed)
            + self.insert_failures.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    pub fn avg_lookup_time_ns(&self) -> u64 {
        let total = self.lookup_time_ns.load(Ordering::Relaxed);
        let count = self.lookups.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Ratio of positive lookups to all lookups
    ///
    /// Includes true positives, so this is an upper bound on the observed
    /// false positive rate.
    pub fn observed_positive_rate(&self) -> f64 {
        let total = self.lookups.load(Ordering::Relaxed);
        let positive = self.lookups_positive.load(Ordering::Relaxed);
        if total > 0 {
            positive as f64 / total as f64
        } else {
            0.0
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.filters_initialized,
            &self.inserts,
            &self.insert_failures,
            &self.relocations,
            &self.lookups,
            &self.lookups_positive,
            &self.deletes,
            &self.delete_misses,
            &self.bytes_persisted,
            &self.insert_time_ns,
            &self.lookup_time_ns,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub filters_initialized: u64,
    pub inserts: u64,
    pub insert_failures: u64,
    pub relocations: u64,
    pub lookups: u64,
    pub lookups_positive: u64,
    pub deletes: u64,
    pub delete_misses: u64,
    pub bytes_persisted: u64,
    pub avg_insert_ns: u64,
    pub avg_lookup_ns: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this to forward registry metrics to an external system.
pub trait MetricsRecorder: Send + Sync {
    fn record_filter_initialized(&self);

    fn record_insert(&self, duration: Duration, inserted: bool, relocated: bool);

    fn record_lookup(&self, duration: Duration, found: bool);

    fn record_delete(&self, deleted: bool);

    fn record_persist(&self, bytes: usize);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_filter_initialized(&self) {}
    fn record_insert(&self, _: Duration, _: bool, _: bool) {}
    fn record_lookup(&self, _: Duration, _: bool) {}
    fn record_delete(&self, _: bool) {}
    fn record_persist(&self, _: usize) {}
}

impl MetricsRecorder for Metrics {
    fn record_filter_initialized(&self) {
        Metrics::record_filter_initialized(self);
    }

    fn record_insert(&self, duration: Duration, inserted: bool, relocated: bool) {
        Metrics::record_insert(self, duration, inserted, relocated);
    }

    fn record_lookup(&self, duration: Duration, found: bool) {
        Metrics::record_lookup(self, duration, found);
    }

    fn record_delete(&self, deleted: bool) {
        Metrics::record_delete(self, deleted);
    }

    fn record_persist(&self, bytes: usize) {
        Metrics::record_persist(self, bytes);
    }
}
