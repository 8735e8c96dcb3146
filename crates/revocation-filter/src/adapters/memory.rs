//! In-memory `StateStore` for tests and embedding

use crate::error::StoreError;
use crate::ports::StateStore;
use std::collections::HashMap;

/// In-memory state store.
///
/// Single-threaded HashMap; values live as long as the store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStateStore {
    data: HashMap<String, Vec<u8>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw value under `key`, bypassing the port.
    pub fn raw(&self, key: &str) -> Option<&[u8]> {
        self.data.get(key).map(Vec::as_slice)
    }

    /// Overwrite a raw value, bypassing the port.
    pub fn set_raw(&mut self, key: &str, value: Vec<u8>) {
        self.data.insert(key.to_string(), value);
    }
}

impl StateStore for InMemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.data.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
