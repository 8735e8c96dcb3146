//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for the contract-dispatch layer
//! - Driven Ports (outbound) - the host key-value store

pub mod inbound;
pub mod outbound;

pub use inbound::{BatchDeleteReport, FilterStats, RevocationRegistryApi};
pub use outbound::StateStore;
