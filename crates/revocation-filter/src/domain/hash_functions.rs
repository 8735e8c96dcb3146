//! Hash functions for the cuckoo filter
//!
//! Every derived value (fingerprint, primary index, alternate index) comes
//! from one seeded 64-bit hash so that a filter decoded in another process
//! places and finds items exactly where the encoding process did.
//!
//! Uses MurmurHash3 (x64, 128-bit, lower 64 bits) with a fixed seed.

use std::io::Cursor;

/// Fixed seed shared by every hash in the filter.
pub const HASH_SEED: u32 = 1337;

/// Hash an element to 64 bits with MurmurHash3 and the given seed
pub fn hash64(element: &[u8], seed: u32) -> u64 {
    let mut cursor = Cursor::new(element);

    // Reading from an in-memory cursor cannot fail
    let hash = murmur3::murmur3_x64_128(&mut cursor, seed).unwrap_or(0);
    hash as u64
}

/// Derive a `size`-byte fingerprint from an element
///
/// The low-order bytes of the hash are packed first. Sizes above 8 bytes are
/// zero padded.
pub fn fingerprint(element: &[u8], size: usize) -> Vec<u8> {
    fingerprint_from_hash(hash64(element, HASH_SEED), size)
}

fn fingerprint_from_hash(hash: u64, size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| if i < 8 { (hash >> (8 * i)) as u8 } else { 0 })
        .collect()
}

/// Primary bucket index for an element
pub fn primary_index(element: &[u8], mask: usize) -> usize {
    (hash64(element, HASH_SEED) as usize) & mask
}

/// Alternate bucket index using partial-key cuckoo hashing
///
/// `alt_index(fp, alt_index(fp, i, mask), mask) == i` for any `i <= mask`.
pub fn alt_index(fp: &[u8], index: usize, mask: usize) -> usize {
    (index ^ hash64(fp, HASH_SEED) as usize) & mask
}

/// Primary index and fingerprint from a single hash computation
pub fn index_and_fingerprint(element: &[u8], mask: usize, fp_size: usize) -> (usize, Vec<u8>) {
    let hash = hash64(element, HASH_SEED);
    ((hash as usize) & mask, fingerprint_from_hash(hash, fp_size))
}

/// Smallest power of two greater than or equal to `n`
///
/// Zero rounds up to one bucket.
pub fn next_pow2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}
