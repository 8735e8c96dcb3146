//! Cuckoo filter configuration and validation
//!
//! # Example
//!
//! ```
//! use revocation_filter::domain::FilterConfigBuilder;
//!
//! let config = FilterConfigBuilder::new()
//!     .expected_elements(10_000)
//!     .bucket_size(4)
//!     .rng_seed(42)
//!     .build()
//!     .expect("valid config");
//! assert_eq!(config.fingerprint_size, 8);
//! ```

use crate::error::FilterError;
use serde::{Deserialize, Serialize};

/// Default slots per bucket.
pub const DEFAULT_BUCKET_SIZE: usize = 4;

/// Default fingerprint length in bytes.
pub const DEFAULT_FINGERPRINT_SIZE: usize = 8;

/// Maximum relocation attempts per insert.
pub const MAX_CUCKOO_KICKS: usize = 500;

/// Longest accepted item, in bytes.
pub const MAX_ITEM_LEN: usize = 1024;

/// Ledger key the filter state lives under.
pub const DEFAULT_STATE_KEY: &str = "CuckooFilterState";

/// Largest fingerprint the state format can carry.
pub const MAX_FINGERPRINT_SIZE: usize = 32;

/// Largest accepted bucket size.
///
/// A sizing policy; the state format itself stores slot counts as `u32`.
pub const MAX_BUCKET_SIZE: usize = 255;

/// Upper bound on the requested element count (2^30).
pub const MAX_EXPECTED_ELEMENTS: usize = 1 << 30;

/// Cuckoo filter configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Requested element count; bucket count is the next power of two
    pub expected_elements: usize,
    /// Slots per bucket
    pub bucket_size: usize,
    /// Fingerprint length in bytes
    pub fingerprint_size: usize,
    /// Relocation attempts before an insert gives up
    pub max_kicks: usize,
    /// Longest accepted item in bytes
    pub max_item_len: usize,
    /// Store key holding the encoded filter
    pub state_key: String,
    /// Seed for relocation randomness; `None` draws from OS entropy
    pub rng_seed: Option<u64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            expected_elements: 1024,
            bucket_size: DEFAULT_BUCKET_SIZE,
            fingerprint_size: DEFAULT_FINGERPRINT_SIZE,
            max_kicks: MAX_CUCKOO_KICKS,
            max_item_len: MAX_ITEM_LEN,
            state_key: DEFAULT_STATE_KEY.to_string(),
            rng_seed: None,
        }
    }
}

impl FilterConfig {
    /// Validate sizes against what the filter and state format support
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.expected_elements == 0 || self.expected_elements > MAX_EXPECTED_ELEMENTS {
            return Err(FilterError::InvalidParameters(format!(
                "expected_elements must be between 1 and {}, got {}",
                MAX_EXPECTED_ELEMENTS, self.expected_elements
            )));
        }

        if self.bucket_size == 0 || self.bucket_size > MAX_BUCKET_SIZE {
            return Err(FilterError::InvalidParameters(format!(
                "bucket_size must be between 1 and {}, got {}",
                MAX_BUCKET_SIZE, self.bucket_size
            )));
        }

        if self.fingerprint_size == 0 || self.fingerprint_size > MAX_FINGERPRINT_SIZE {
            return Err(FilterError::InvalidParameters(format!(
                "fingerprint_size must be between 1 and {}, got {}",
                MAX_FINGERPRINT_SIZE, self.fingerprint_size
            )));
        }

        if self.max_item_len == 0 {
            return Err(FilterError::InvalidParameters(
                "max_item_len cannot be 0".to_string(),
            ));
        }

        if self.state_key.is_empty() {
            return Err(FilterError::InvalidParameters(
                "state_key cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder-style method to set the expected element count
    pub fn with_expected_elements(mut self, n: usize) -> Self {
        self.expected_elements = n;
        self
    }

    /// Builder-style method to set the bucket size
    pub fn with_bucket_size(mut self, size: usize) -> Self {
        self.bucket_size = size;
        self
    }

    /// Builder-style method to pin relocation randomness
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

/// Builder for FilterConfig with validation
#[derive(Default)]
pub struct FilterConfigBuilder {
    expected_elements: Option<usize>,
    bucket_size: Option<usize>,
    fingerprint_size: Option<usize>,
    max_kicks: Option<usize>,
    max_item_len: Option<usize>,
    state_key: Option<String>,
    rng_seed: Option<u64>,
}

impl FilterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expected_elements(mut self, n: usize) -> Self {
        self.expected_elements = Some(n);
        self
    }

    pub fn bucket_size(mut self, size: usize) -> Self {
        self.bucket_size = Some(size);
        self
    }

    pub fn fingerprint_size(mut self, bytes: usize) -> Self {
        self.fingerprint_size = Some(bytes);
        self
    }

    pub fn max_kicks(mut self, kicks: usize) -> Self {
        self.max_kicks = Some(kicks);
        self
    }

    pub fn max_item_len(mut self, bytes: usize) -> Self {
        self.max_item_len = Some(bytes);
        self
    }

    pub fn state_key(mut self, key: impl Into<String>) -> Self {
        self.state_key = Some(key.into());
        self
    }

    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Build the FilterConfig, validating all parameters
    pub fn build(self) -> Result<FilterConfig, FilterError> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Build without validation
    pub fn build_unchecked(self) -> FilterConfig {
        let defaults = FilterConfig::default();

        FilterConfig {
            expected_elements: self.expected_elements.unwrap_or(defaults.expected_elements),
            bucket_size: self.bucket_size.unwrap_or(defaults.bucket_size),
            fingerprint_size: self.fingerprint_size.unwrap_or(defaults.fingerprint_size),
            max_kicks: self.max_kicks.unwrap_or(defaults.max_kicks),
            max_item_len: self.max_item_len.unwrap_or(defaults.max_item_len),
            state_key: self.state_key.unwrap_or(defaults.state_key),
            rng_seed: self.rng_seed.or(defaults.rng_seed),
        }
    }
}
