//! # pacta_core
//!
//! Core domain logic for Pacta: provider registry and routing policy,
//! embedding backends, retry/failover, result caching, the concurrent
//! batch pipeline, and document processing status.

pub mod config;
pub mod embedding;
pub mod models;
pub mod status;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
