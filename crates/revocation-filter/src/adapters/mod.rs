//! Adapters Layer
//!
//! `StateStore` implementations:
//! - `InMemoryStateStore`: HashMap-backed, for tests and embedding
//! - `FileStateStore`: one file per key under a directory

pub mod file;
pub mod memory;

pub use file::FileStateStore;
pub use memory::InMemoryStateStore;
