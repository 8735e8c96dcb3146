//! # Revocation Filter
//!
//! Ledger-persisted cuckoo filter answering "has this credential been
//! revoked?" with no false negatives and a bounded false positive rate.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure data structures, no I/O
//!   - `CuckooFilter`: two-choice placement with bounded relocation
//!   - `Bucket`, `Fingerprint`: fixed-size slot arrays
//!   - `encode` / `decode`: versioned, checksummed state format
//!   - `FilterConfig`, `FilterConfigBuilder`: sizing and limits
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `RevocationRegistryApi`: Driving port (operation surface)
//!   - `StateStore`: Driven port (host key-value store)
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `RevocationRegistryService`: load → decode → operate → encode → persist
//!
//! - **Adapters Layer** (`adapters/`): `StateStore` implementations
//!   - `InMemoryStateStore`, `FileStateStore`
//!
//! ## Invariants
//!
//! - No false negatives: an inserted, not deleted item always looks up `true`.
//! - Failed inserts and failed batch inserts persist nothing.
//! - Bucket count is a power of two; the index mask is `bucket_count - 1`.
//!
//! ## Concurrency
//!
//! The service performs one `get` and at most one `put` per call and holds no
//! lock. Hosts running calls concurrently must serialize read-modify-write
//! cycles per state key.
//!
//! ## Usage Example
//!
//! ```
//! use revocation_filter::{InMemoryStateStore, RevocationRegistryApi, RevocationRegistryService};
//!
//! let mut registry = RevocationRegistryService::new(InMemoryStateStore::new());
//! registry.init_ledger(1000, 4)?;
//!
//! registry.insert("urn:uuid:3978344f-8596-4c3a-a978-8fcaba3903c5")?;
//! assert!(registry.lookup("urn:uuid:3978344f-8596-4c3a-a978-8fcaba3903c5")?);
//!
//! registry.delete("urn:uuid:3978344f-8596-4c3a-a978-8fcaba3903c5")?;
//! assert!(!registry.lookup("urn:uuid:3978344f-8596-4c3a-a978-8fcaba3903c5")?);
//! # Ok::<(), revocation_filter::FilterError>(())
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{FileStateStore, InMemoryStateStore};
pub use domain::{
    decode, encode, Bucket, CuckooFilter, FilterConfig, FilterConfigBuilder, Fingerprint,
    InsertOutcome,
};
pub use error::{CodecError, FilterError, Result, StoreError};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{BatchDeleteReport, FilterStats, RevocationRegistryApi, StateStore};
pub use service::RevocationRegistryService;
