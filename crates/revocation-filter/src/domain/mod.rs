//! Domain Layer - Pure business logic
//!
//! This layer contains:
//! - Hash functions (fingerprint, primary and alternate index)
//! - Fingerprint buckets
//! - Cuckoo filter (insert with bounded relocation, lookup, delete)
//! - State codec
//! - Configuration
//!
//! RULES:
//! - No I/O operations
//! - No shared mutable state; randomness is passed in per call

pub mod bucket;
pub mod codec;
pub mod config;
pub mod cuckoo;
pub mod hash_functions;

pub use bucket::{Bucket, Fingerprint};
pub use codec::{decode, encode, FORMAT_VERSION};
pub use config::{
    FilterConfig, FilterConfigBuilder, DEFAULT_BUCKET_SIZE, DEFAULT_FINGERPRINT_SIZE,
    DEFAULT_STATE_KEY, MAX_BUCKET_SIZE, MAX_CUCKOO_KICKS, MAX_FINGERPRINT_SIZE, MAX_ITEM_LEN,
};
pub use cuckoo::{CuckooFilter, InsertOutcome, OVERFILL_FACTOR};
