//! Outbound Ports (Driven Ports)
//!
//! What the revocation registry needs from its host: a key-value store that
//! can read and write one opaque value per key.

use crate::error::StoreError;

/// Host key-value store holding the encoded filter.
///
/// The registry performs one `get` at the start of every call and one `put`
/// after every successful mutating call. It does not serialize concurrent
/// read-modify-write cycles on the same key; hosts that run calls
/// concurrently must order them per key (e.g. through their own transaction
/// mechanism) or updates can be lost.
///
/// Production: the ledger's world-state accessor.
/// Testing: `InMemoryStateStore`.
pub trait StateStore: Send + Sync {
    /// Read the value stored under `key`; `Ok(None)` when absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

impl<S: StateStore + ?Sized> StateStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value)
    }
}
