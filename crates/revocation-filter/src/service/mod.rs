//! Service Layer
//!
//! Application service that runs each registry call as one
//! load → decode → mutate → encode → persist cycle against the state store.

pub mod registry_service;

pub use registry_service::RevocationRegistryService;
