//! Revocation Registry Service
//!
//! Implements `RevocationRegistryApi` on top of a `StateStore`. The filter is
//! never kept between calls: every call decodes it from the store, and
//! mutating calls write it back only after the whole operation succeeded.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::{decode, encode, CuckooFilter, FilterConfig, InsertOutcome};
use crate::error::{FilterError, Result};
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::{BatchDeleteReport, FilterStats, RevocationRegistryApi, StateStore};

/// Revocation registry service
///
/// Not internally synchronized: callers sharing one store across threads
/// must order calls per state key.
pub struct RevocationRegistryService<S: StateStore> {
    /// Host key-value store (driven port)
    store: S,
    /// Sizing, limits and state key
    config: FilterConfig,
    /// Metrics sink
    metrics: Arc<dyn MetricsRecorder>,
    /// Mixed into the configured seed so each call gets its own stream
    operations: u64,
}

impl<S: StateStore> RevocationRegistryService<S> {
    /// Create a service with the default configuration
    pub fn new(store: S) -> Self {
        Self::with_config(store, FilterConfig::default())
    }

    /// Create with a custom configuration
    pub fn with_config(store: S, config: FilterConfig) -> Self {
        Self {
            store,
            config,
            metrics: Arc::new(NoOpMetrics),
            operations: 0,
        }
    }

    /// Attach a metrics recorder
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn state_key(&self) -> &str {
        &self.config.state_key
    }

    /// Fetch the raw persisted state
    fn load_bytes(&self) -> Result<Vec<u8>> {
        let key = self.state_key();
        self.store
            .get(key)?
            .ok_or_else(|| FilterError::StateNotFound {
                key: key.to_string(),
            })
    }

    fn decode_state(&self, bytes: &[u8]) -> Result<CuckooFilter> {
        let filter = decode(bytes).map_err(|e| {
            warn!(key = self.state_key(), error = %e, "Persisted filter state is unreadable");
            e
        })?;

        Ok(filter.with_limits(self.config.max_kicks, self.config.max_item_len))
    }

    /// Load and decode the persisted filter
    fn load_filter(&self) -> Result<CuckooFilter> {
        self.decode_state(&self.load_bytes()?)
    }

    /// Encode and persist the filter
    fn save_filter(&mut self, filter: &CuckooFilter) -> Result<()> {
        let bytes = encode(filter).map_err(FilterError::StateUnencodable)?;
        self.store.put(&self.config.state_key, &bytes)?;
        self.metrics.record_persist(bytes.len());
        debug!(
            key = %self.config.state_key,
            bytes = bytes.len(),
            count = filter.len(),
            "Persisted filter state"
        );
        Ok(())
    }

    /// Call-local RNG: reproducible per call when a seed is configured
    fn next_rng(&mut self) -> StdRng {
        self.operations = self.operations.wrapping_add(1);
        match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ self.operations),
            None => StdRng::from_entropy(),
        }
    }

    fn check_item(&self, item: &str) -> Result<()> {
        if item.is_empty() || item.len() > self.config.max_item_len {
            return Err(FilterError::InvalidItem {
                len: item.len(),
                max: self.config.max_item_len,
            });
        }
        Ok(())
    }

    /// Insert into an already loaded filter, recording metrics
    fn insert_into(
        &self,
        filter: &mut CuckooFilter,
        item: &str,
        rng: &mut StdRng,
    ) -> InsertOutcome {
        let start = Instant::now();
        let outcome = filter.try_insert(item.as_bytes(), rng);
        self.metrics.record_insert(
            start.elapsed(),
            outcome.is_inserted(),
            outcome == InsertOutcome::Relocated,
        );
        outcome
    }

    fn lookup_in(&self, filter: &CuckooFilter, item: &str) -> bool {
        let start = Instant::now();
        let found = filter.lookup(item.as_bytes());
        self.metrics.record_lookup(start.elapsed(), found);
        found
    }
}

impl<S: StateStore> RevocationRegistryApi for RevocationRegistryService<S> {
    fn init_ledger(&mut self, expected_elements: usize, bucket_size: usize) -> Result<()> {
        let config = self
            .config
            .clone()
            .with_expected_elements(expected_elements)
            .with_bucket_size(bucket_size);
        config.validate()?;

        let filter = CuckooFilter::from_config(&config);
        info!(
            key = %config.state_key,
            buckets = filter.bucket_count(),
            bucket_size,
            capacity = filter.capacity(),
            "Initializing cuckoo filter"
        );

        self.save_filter(&filter)?;
        self.metrics.record_filter_initialized();
        Ok(())
    }

    fn insert(&mut self, item: &str) -> Result<()> {
        self.check_item(item)?;
        let mut filter = self.load_filter()?;
        let mut rng = self.next_rng();

        match self.insert_into(&mut filter, item, &mut rng) {
            InsertOutcome::Inserted | InsertOutcome::Relocated => self.save_filter(&filter),
            outcome => {
                warn!(item, ?outcome, "Insert rejected");
                Err(FilterError::InsertFailed {
                    item: item.to_string(),
                })
            }
        }
    }

    fn lookup(&self, item: &str) -> Result<bool> {
        let filter = self.load_filter()?;
        Ok(self.lookup_in(&filter, item))
    }

    fn delete(&mut self, item: &str) -> Result<()> {
        let mut filter = self.load_filter()?;

        let deleted = filter.delete(item.as_bytes());
        self.metrics.record_delete(deleted);
        if !deleted {
            debug!(item, "Delete missed");
            return Err(FilterError::DeleteFailed {
                item: item.to_string(),
            });
        }

        self.save_filter(&filter)
    }

    fn batch_insert(&mut self, items: &[String]) -> Result<()> {
        let mut filter = self.load_filter()?;
        let mut rng = self.next_rng();

        for (index, item) in items.iter().enumerate() {
            let placed = self.check_item(item).is_ok()
                && self.insert_into(&mut filter, item, &mut rng).is_inserted();
            if !placed {
                warn!(index, item = %item, total = items.len(), "Batch insert aborted");
                return Err(FilterError::BatchInsertFailed {
                    index,
                    item: item.clone(),
                });
            }
        }

        self.save_filter(&filter)
    }

    fn batch_delete(&mut self, items: &[String]) -> Result<BatchDeleteReport> {
        let mut filter = self.load_filter()?;
        let mut report = BatchDeleteReport::default();

        for item in items {
            let deleted = filter.delete(item.as_bytes());
            self.metrics.record_delete(deleted);
            if deleted {
                report.deleted.push(item.clone());
            } else {
                report.missing.push(item.clone());
            }
        }

        if !report.all_deleted() {
            debug!(missing = report.missing.len(), "Batch delete missed items");
        }
        self.save_filter(&filter)?;
        Ok(report)
    }

    fn batch_lookup(&self, items: &[String]) -> Result<HashMap<String, bool>> {
        let filter = self.load_filter()?;

        Ok(items
            .iter()
            .map(|item| (item.clone(), self.lookup_in(&filter, item)))
            .collect())
    }

    fn reset(&mut self) -> Result<()> {
        let mut filter = self.load_filter()?;
        filter.reset();
        info!(key = %self.config.state_key, "Reset cuckoo filter");
        self.save_filter(&filter)
    }

    fn capacity(&self) -> Result<usize> {
        Ok(self.load_filter()?.capacity())
    }

    fn stats(&self) -> Result<FilterStats> {
        let bytes = self.load_bytes()?;
        let filter = self.decode_state(&bytes)?;

        Ok(FilterStats {
            count: filter.len(),
            occupancy: filter.occupancy(),
            capacity: filter.capacity(),
            bucket_count: filter.bucket_count(),
            bucket_size: filter.bucket_size(),
            fingerprint_size: filter.fingerprint_size(),
            load_factor: filter.load_factor(),
            encoded_bytes: bytes.len(),
        })
    }
}
