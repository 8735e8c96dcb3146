//! # Registry Property Tests
//!
//! End-to-end checks of the revocation registry through its public API.
//!
//! ## Test Categories
//!
//! 1. **Membership** - no false negatives, bounded false positives
//! 2. **Mutation** - delete, duplicate, invalid input, reset
//! 3. **Persistence** - state survives fresh service instances and disk
//! 4. **Hostile State** - corrupted bytes never decode silently

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use revocation_filter::domain::DEFAULT_BUCKET_SIZE;
use revocation_filter::{
    decode, encode, CodecError, CuckooFilter, FileStateStore, FilterConfig, FilterError,
    InMemoryStateStore, RevocationRegistryApi, RevocationRegistryService, StateStore,
};
use std::collections::HashSet;

// =============================================================================
// TEST HELPERS
// =============================================================================

fn credential_id(i: usize) -> String {
    format!("urn:uuid:credential-{:08}", i)
}

fn registry(expected: usize) -> RevocationRegistryService<InMemoryStateStore> {
    let config = FilterConfig::default().with_rng_seed(2024);
    let mut registry = RevocationRegistryService::with_config(InMemoryStateStore::new(), config);
    registry.init_ledger(expected, DEFAULT_BUCKET_SIZE).unwrap();
    registry
}

// =============================================================================
// MEMBERSHIP
// =============================================================================

#[test]
fn test_no_false_negatives_across_mixed_operations() {
    let mut registry = registry(2048);
    let mut rng = StdRng::seed_from_u64(99);
    let mut present = HashSet::new();

    for step in 0..3000 {
        let id = credential_id(rng.gen_range(0..1500));
        if rng.gen_bool(0.7) {
            if registry.insert(&id).is_ok() {
                present.insert(id);
            }
        } else if present.remove(&id) {
            registry.delete(&id).unwrap();
        }

        if step % 500 == 0 {
            for id in &present {
                assert!(registry.lookup(id).unwrap(), "false negative for {}", id);
            }
        }
    }

    for id in &present {
        assert!(registry.lookup(id).unwrap(), "false negative for {}", id);
    }
}

#[test]
fn test_false_positive_rate_is_bounded() {
    let mut filter = CuckooFilter::new(4096, DEFAULT_BUCKET_SIZE);
    for i in 0..1000 {
        assert!(filter.insert(credential_id(i).as_bytes()));
    }

    let false_positives = (1_000_000..1_020_000)
        .filter(|&i| filter.lookup(credential_id(i).as_bytes()))
        .count();

    let fpr = false_positives as f64 / 20_000.0;
    assert!(fpr <= 0.03, "FPR too high: {}", fpr);
}

#[test]
fn test_capacity_rejection() {
    let mut filter = CuckooFilter::new(100, DEFAULT_BUCKET_SIZE);

    let failures = (0..1000).filter(|&i| !filter.insert(&[i as u8])).count();

    assert!(failures > 0, "all 1000 insertions succeeded");
}

#[test]
fn test_small_filter_eventually_refuses() {
    let mut registry = registry(16);
    let capacity = registry.capacity().unwrap();

    let accepted = (0..capacity * 2)
        .filter(|&i| registry.insert(&credential_id(i)).is_ok())
        .count();

    assert!(accepted <= capacity);
    assert!(accepted < capacity * 2);
    let stats = registry.stats().unwrap();
    assert_eq!(stats.count, accepted);
    assert_eq!(stats.occupancy, accepted);
}

// =============================================================================
// MUTATION
// =============================================================================

#[test]
fn test_delete_then_lookup_and_double_delete() {
    let mut registry = registry(128);

    registry.insert("revoked").unwrap();
    registry.delete("revoked").unwrap();

    assert!(!registry.lookup("revoked").unwrap());
    assert!(matches!(
        registry.delete("revoked"),
        Err(FilterError::DeleteFailed { .. })
    ));
}

#[test]
fn test_duplicate_rejection_keeps_count() {
    let mut registry = registry(128);

    registry.insert("x").unwrap();
    assert!(registry.insert("x").is_err());

    assert_eq!(registry.stats().unwrap().count, 1);
}

#[test]
fn test_invalid_input_rejection() {
    let mut filter = CuckooFilter::new(128, DEFAULT_BUCKET_SIZE);
    let before = encode(&filter).unwrap();

    assert!(!filter.insert(b""));
    assert!(!filter.insert(&[7u8; 1025]));

    assert_eq!(encode(&filter).unwrap(), before);
}

#[test]
fn test_reset_forgets_everything() {
    let mut registry = registry(256);
    let ids: Vec<String> = (0..100).map(credential_id).collect();
    registry.batch_insert(&ids).unwrap();

    registry.reset().unwrap();

    assert_eq!(registry.stats().unwrap().count, 0);
    let results = registry.batch_lookup(&ids).unwrap();
    assert!(results.values().all(|found| !found));

    // The filter is reusable after a reset
    registry.batch_insert(&ids).unwrap();
    assert!(registry.lookup(&ids[0]).unwrap());
}

// =============================================================================
// PERSISTENCE
// =============================================================================

#[test]
fn test_roundtrip_fifty_items() {
    let mut filter = CuckooFilter::new(1000, DEFAULT_BUCKET_SIZE);
    for i in 0..50 {
        assert!(filter.insert(credential_id(i).as_bytes()));
    }

    let restored = decode(&encode(&filter).unwrap()).unwrap();

    for i in 0..50 {
        assert!(restored.lookup(credential_id(i).as_bytes()));
    }
    assert_eq!(restored.len(), 50);
}

#[test]
fn test_fresh_service_instances_share_state() {
    let mut first = registry(512);
    let ids: Vec<String> = (0..200).map(credential_id).collect();
    first.batch_insert(&ids).unwrap();

    // A new service over the same store sees everything
    let store = first.into_store();
    let second = RevocationRegistryService::new(store);
    let results = second.batch_lookup(&ids).unwrap();
    assert!(results.values().all(|&found| found));
}

#[test]
fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = FileStateStore::open(dir.path()).unwrap();
        let mut registry = RevocationRegistryService::new(store);
        registry.init_ledger(256, DEFAULT_BUCKET_SIZE).unwrap();
        registry.insert("did:example:holder#vc-1").unwrap();
        registry.insert("did:example:holder#vc-2").unwrap();
        registry.delete("did:example:holder#vc-2").unwrap();
    }

    let store = FileStateStore::open(dir.path()).unwrap();
    let registry = RevocationRegistryService::new(store);

    assert!(registry.lookup("did:example:holder#vc-1").unwrap());
    assert!(!registry.lookup("did:example:holder#vc-2").unwrap());
    assert_eq!(registry.stats().unwrap().count, 1);
}

// =============================================================================
// HOSTILE STATE
// =============================================================================

#[test]
fn test_every_single_byte_flip_is_detected() {
    let mut filter = CuckooFilter::new(8, 2);
    for i in 0..6 {
        filter.insert(credential_id(i).as_bytes());
    }
    let bytes = encode(&filter).unwrap();

    for offset in 0..bytes.len() {
        let mut corrupted = bytes.clone();
        corrupted[offset] ^= 0x01;
        assert!(
            decode(&corrupted).is_err(),
            "flip at offset {} decoded successfully",
            offset
        );
    }
}

#[test]
fn test_garbage_state_is_reported() {
    let mut store = InMemoryStateStore::new();
    store.put("CuckooFilterState", &[0u8; 64]).unwrap();
    let registry = RevocationRegistryService::new(store);

    assert!(matches!(
        registry.lookup("anything"),
        Err(FilterError::StateUnreadable(CodecError::BadMagic { .. }))
    ));
}

proptest! {
    #[test]
    fn prop_inserted_items_survive_persistence(
        ids in proptest::collection::hash_set("[a-z0-9:#-]{1,40}", 1..60)
    ) {
        let mut registry = registry(256);
        let ids: Vec<String> = ids.into_iter().collect();

        registry.batch_insert(&ids).unwrap();

        let results = registry.batch_lookup(&ids).unwrap();
        prop_assert!(results.values().all(|&found| found));
    }

    #[test]
    fn prop_insert_then_delete_is_absent(id in "[ -~]{1,128}") {
        let mut registry = registry(64);

        registry.insert(&id).unwrap();
        registry.delete(&id).unwrap();

        prop_assert!(!registry.lookup(&id).unwrap());
    }
}
