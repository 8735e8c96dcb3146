//! Inbound Ports (Driving Ports)
//!
//! The operation surface consumed by the contract-dispatch layer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::FilterError;

/// Per-item outcome of a best-effort batch delete
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDeleteReport {
    /// Items whose fingerprint was found and removed
    pub deleted: Vec<String>,
    /// Items with no matching fingerprint
    pub missing: Vec<String>,
}

impl BatchDeleteReport {
    pub fn all_deleted(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Point-in-time view of the persisted filter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterStats {
    /// Advisory item count
    pub count: usize,
    /// Occupied slots, counted by scanning
    pub occupancy: usize,
    /// Bucket count times bucket size
    pub capacity: usize,
    pub bucket_count: usize,
    pub bucket_size: usize,
    pub fingerprint_size: usize,
    pub load_factor: f64,
    /// Size of the encoded state in bytes
    pub encoded_bytes: usize,
}

/// Revocation registry API (Driving Port)
///
/// Every call loads the filter from the state store; mutating calls persist
/// it again only when they succeed.
pub trait RevocationRegistryApi {
    /// Build a fresh filter and persist it, replacing any existing state.
    fn init_ledger(&mut self, expected_elements: usize, bucket_size: usize)
        -> Result<(), FilterError>;

    /// Add an item. Duplicates and items that find no home are errors.
    fn insert(&mut self, item: &str) -> Result<(), FilterError>;

    /// Check whether an item might be present.
    fn lookup(&self, item: &str) -> Result<bool, FilterError>;

    /// Remove an item. Unknown items are errors.
    fn delete(&mut self, item: &str) -> Result<(), FilterError>;

    /// Insert every item or none: the first failure aborts without persisting.
    fn batch_insert(&mut self, items: &[String]) -> Result<(), FilterError>;

    /// Delete every item that is present; always persists.
    fn batch_delete(&mut self, items: &[String]) -> Result<BatchDeleteReport, FilterError>;

    /// Look up every item.
    fn batch_lookup(&self, items: &[String]) -> Result<HashMap<String, bool>, FilterError>;

    /// Clear the persisted filter, keeping its shape.
    fn reset(&mut self) -> Result<(), FilterError>;

    /// Nominal slot capacity of the persisted filter.
    fn capacity(&self) -> Result<usize, FilterError>;

    /// Summary of the persisted filter.
    fn stats(&self) -> Result<FilterStats, FilterError>;
}
