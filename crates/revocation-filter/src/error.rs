//! Error types for the revocation filter

use thiserror::Error;

/// Result alias for registry operations
pub type Result<T> = std::result::Result<T, FilterError>;

/// Errors surfaced by registry operations
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid item length: {len} (must be between 1 and {max} bytes)")]
    InvalidItem { len: usize, max: usize },

    #[error("Failed to insert '{item}' into cuckoo filter")]
    InsertFailed { item: String },

    #[error("Failed to delete '{item}' from cuckoo filter")]
    DeleteFailed { item: String },

    #[error("Batch insert aborted at item {index} ('{item}'); nothing persisted")]
    BatchInsertFailed { index: usize, item: String },

    #[error("Filter state not found under key '{key}'")]
    StateNotFound { key: String },

    #[error("Filter state unreadable: {0}")]
    StateUnreadable(#[from] CodecError),

    #[error("Filter state cannot be encoded: {0}")]
    StateUnencodable(CodecError),

    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid filter parameters: {0}")]
    InvalidParameters(String),
}

/// Structural failures while encoding or decoding filter state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Unexpected end of input at offset {offset} (needed {needed} more bytes)")]
    Truncated { offset: usize, needed: usize },

    #[error("Bad magic bytes: {found:02x?}")]
    BadMagic { found: [u8; 4] },

    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(u8),

    #[error("Checksum mismatch: expected {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("Invalid fingerprint size: {0}")]
    InvalidFingerprintSize(u8),

    #[error("Invalid bucket count: {0} (must be a non-zero power of two)")]
    InvalidBucketCount(u32),

    #[error("Bucket index mask {mask} does not match bucket count {buckets}")]
    MaskMismatch { mask: u64, buckets: u32 },

    #[error("Bucket {bucket} has {found} slots, expected {expected}")]
    NonUniformBucket { bucket: usize, found: u32, expected: u32 },

    #[error("Invalid slot length {len} in bucket {bucket} (fingerprint size {fp_size})")]
    InvalidSlotLength { bucket: usize, len: u8, fp_size: u8 },

    #[error("Count {0} does not fit this platform")]
    CountOverflow(u64),

    #[error("{0} trailing bytes after filter state")]
    TrailingBytes(usize),

    #[error(
        "Cannot encode fingerprint size {0} (must be 1..={max})",
        max = crate::domain::MAX_FINGERPRINT_SIZE
    )]
    UnencodableFingerprintSize(usize),

    #[error("Cannot encode bucket count {0} (must be a non-zero power of two within u32)")]
    UnencodableBucketCount(usize),

    #[error("Cannot encode bucket {bucket} with {slots} slots (must be non-zero and within u32)")]
    UnencodableBucketSize { bucket: usize, slots: usize },

    #[error("Cannot encode a {len}-byte fingerprint in bucket {bucket}")]
    UnencodableSlot { bucket: usize, len: usize },
}

/// Errors from the host key-value store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("I/O error for key '{key}': {message}")]
    Io { key: String, message: String },

    #[error("Store backend error: {0}")]
    Backend(String),
}
