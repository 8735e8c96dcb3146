//! # Cuckoo Filter
//!
//! Space-efficient probabilistic set supporting deletion, used to answer
//! "has this credential been revoked?".
//!
//! ## Placement
//!
//! Every item has two candidate buckets, `i1 = hash(item) & mask` and
//! `i2 = i1 ^ hash(fingerprint) & mask`. Because the alternate index only
//! needs the fingerprint, a stored entry can be moved to its other home
//! without knowing the original item.
//!
//! When both candidates are full, insertion runs a bounded relocation search:
//! each round evicts one random occupant of a random candidate and tries to
//! re-house it in its alternate bucket. A round that fails leaves the filter
//! untouched; there is no transitive kick chain.
//!
//! ## Invariants
//!
//! - Bucket count is a power of two and `bucket_index_mask == bucket_count - 1`.
//! - No false negatives: an inserted, not deleted item is always found.
//! - A failed insert changes neither buckets nor `count`.
//!
//! `count` is advisory. Use [`CuckooFilter::occupancy`] for an exact figure.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::bucket::{Bucket, Fingerprint};
use super::config::{FilterConfig, DEFAULT_FINGERPRINT_SIZE, MAX_CUCKOO_KICKS, MAX_ITEM_LEN};
use super::hash_functions::{alt_index, index_and_fingerprint, next_pow2};

/// Soft cap on `count` relative to nominal capacity.
pub const OVERFILL_FACTOR: f64 = 1.7;

/// How an insert attempt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Placed directly in one of the two candidate buckets
    Inserted,
    /// Placed after moving one occupant to its alternate bucket
    Relocated,
    /// Already present; duplicates are refused
    Duplicate,
    /// Empty or longer than the item limit
    InvalidItem,
    /// No home found within the relocation budget, or overfilled
    Full,
}

impl InsertOutcome {
    pub fn is_inserted(self) -> bool {
        matches!(self, InsertOutcome::Inserted | InsertOutcome::Relocated)
    }
}

/// Cuckoo filter for probabilistic membership testing with deletion.
///
/// `Default` yields an uninitialized filter with no buckets: lookups answer
/// `false` and inserts fail.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CuckooFilter {
    buckets: Vec<Bucket>,
    count: usize,
    bucket_index_mask: usize,
    bucket_size: usize,
    fingerprint_size: usize,
    max_kicks: usize,
    max_item_len: usize,
}

impl CuckooFilter {
    /// Create a filter for `expected_elements` items with `bucket_size` slots
    /// per bucket and 8-byte fingerprints.
    pub fn new(expected_elements: usize, bucket_size: usize) -> Self {
        Self::with_fingerprint_size(expected_elements, bucket_size, DEFAULT_FINGERPRINT_SIZE)
    }

    /// Create a filter with an explicit fingerprint length.
    pub fn with_fingerprint_size(
        expected_elements: usize,
        bucket_size: usize,
        fingerprint_size: usize,
    ) -> Self {
        let bucket_count = next_pow2(expected_elements);

        Self {
            buckets: vec![Bucket::new(bucket_size); bucket_count],
            count: 0,
            bucket_index_mask: bucket_count - 1,
            bucket_size,
            fingerprint_size,
            max_kicks: MAX_CUCKOO_KICKS,
            max_item_len: MAX_ITEM_LEN,
        }
    }

    /// Create a filter from a configuration. Call `validate` first.
    pub fn from_config(config: &FilterConfig) -> Self {
        Self::with_fingerprint_size(
            config.expected_elements,
            config.bucket_size,
            config.fingerprint_size,
        )
        .with_limits(config.max_kicks, config.max_item_len)
    }

    /// Reassemble a filter from decoded state.
    pub(crate) fn from_parts(
        buckets: Vec<Bucket>,
        count: usize,
        bucket_index_mask: usize,
        fingerprint_size: usize,
    ) -> Self {
        let bucket_size = buckets.first().map(Bucket::size).unwrap_or(0);

        Self {
            buckets,
            count,
            bucket_index_mask,
            bucket_size,
            fingerprint_size,
            max_kicks: MAX_CUCKOO_KICKS,
            max_item_len: MAX_ITEM_LEN,
        }
    }

    /// Override the relocation budget and item length limit.
    ///
    /// Neither is part of the persisted state.
    pub fn with_limits(mut self, max_kicks: usize, max_item_len: usize) -> Self {
        self.max_kicks = max_kicks;
        self.max_item_len = max_item_len;
        self
    }

    /// Insert an item using a freshly seeded, call-local RNG.
    ///
    /// Returns `true` if the item was placed.
    pub fn insert(&mut self, item: &[u8]) -> bool {
        let mut rng = StdRng::from_entropy();
        self.insert_with_rng(item, &mut rng)
    }

    /// Insert an item, drawing relocation choices from `rng`.
    pub fn insert_with_rng<R: Rng + ?Sized>(&mut self, item: &[u8], rng: &mut R) -> bool {
        self.try_insert(item, rng).is_inserted()
    }

    /// Insert an item and report how the attempt ended.
    pub fn try_insert<R: Rng + ?Sized>(&mut self, item: &[u8], rng: &mut R) -> InsertOutcome {
        if item.is_empty() || item.len() > self.max_item_len {
            return InsertOutcome::InvalidItem;
        }
        if self.buckets.is_empty() {
            return InsertOutcome::Full;
        }
        if self.lookup(item) {
            return InsertOutcome::Duplicate;
        }

        let (i1, fp) = index_and_fingerprint(item, self.bucket_index_mask, self.fingerprint_size);
        let i2 = alt_index(&fp, i1, self.bucket_index_mask);
        if i1 >= self.buckets.len() || i2 >= self.buckets.len() {
            return InsertOutcome::Full;
        }

        if self.buckets[i1].insert(&fp) || self.buckets[i2].insert(&fp) {
            self.bump_count();
            return InsertOutcome::Inserted;
        }

        self.relocate(fp, i1, i2, rng)
    }

    /// Bounded single-level relocation.
    fn relocate<R: Rng + ?Sized>(
        &mut self,
        fp: Vec<u8>,
        i1: usize,
        i2: usize,
        rng: &mut R,
    ) -> InsertOutcome {
        for _ in 0..self.max_kicks {
            if self.count >= self.overfill_threshold() {
                return InsertOutcome::Full;
            }

            let j = if rng.gen::<bool>() { i1 } else { i2 };

            if !self.buckets[j].is_full() {
                self.buckets[j].insert(&fp);
                self.bump_count();
                return InsertOutcome::Inserted;
            }

            let Some((slot, victim)) = self.buckets[j].random_occupant(rng) else {
                continue;
            };

            // The victim's other home; j itself means it has nowhere to go
            let alt = alt_index(victim.as_bytes(), j, self.bucket_index_mask);
            if alt == j || alt >= self.buckets.len() {
                continue;
            }

            if self.buckets[alt].insert(victim.as_bytes()) {
                self.buckets[j].replace(slot, Fingerprint::from(fp));
                self.bump_count();
                return InsertOutcome::Relocated;
            }
        }

        InsertOutcome::Full
    }

    fn bump_count(&mut self) {
        if self.count < self.overfill_threshold() {
            self.count += 1;
        }
    }

    /// Check if an item might be in the filter.
    pub fn lookup(&self, item: &[u8]) -> bool {
        if self.buckets.is_empty() {
            return false;
        }

        let (i1, fp) = index_and_fingerprint(item, self.bucket_index_mask, self.fingerprint_size);
        let i2 = alt_index(&fp, i1, self.bucket_index_mask);

        let found_in = |i: usize| self.buckets.get(i).is_some_and(|b| b.contains(&fp));
        found_in(i1) || found_in(i2)
    }

    /// Delete an item from the filter.
    ///
    /// Returns `true` if a matching fingerprint was removed.
    pub fn delete(&mut self, item: &[u8]) -> bool {
        if self.buckets.is_empty() {
            return false;
        }

        let (i1, fp) = index_and_fingerprint(item, self.bucket_index_mask, self.fingerprint_size);
        let i2 = alt_index(&fp, i1, self.bucket_index_mask);

        for i in [i1, i2] {
            if let Some(bucket) = self.buckets.get_mut(i) {
                if bucket.delete(&fp) {
                    self.count = self.count.saturating_sub(1);
                    return true;
                }
            }
        }
        false
    }

    /// Clear every bucket and zero the count.
    pub fn reset(&mut self) {
        self.buckets.iter_mut().for_each(Bucket::reset);
        self.count = 0;
    }

    /// Nominal slot capacity.
    pub fn capacity(&self) -> usize {
        self.buckets.len() * self.bucket_size
    }

    /// Count at which relocation stops being attempted.
    pub fn overfill_threshold(&self) -> usize {
        (self.capacity() as f64 * OVERFILL_FACTOR) as usize
    }

    /// Advisory item count.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Exact number of occupied slots, by scanning every bucket.
    pub fn occupancy(&self) -> usize {
        self.buckets.iter().map(Bucket::len).sum()
    }

    /// Occupied slots over capacity.
    pub fn load_factor(&self) -> f64 {
        match self.capacity() {
            0 => 0.0,
            capacity => self.occupancy() as f64 / capacity as f64,
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    pub fn fingerprint_size(&self) -> usize {
        self.fingerprint_size
    }

    pub fn bucket_index_mask(&self) -> usize {
        self.bucket_index_mask
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }
}
