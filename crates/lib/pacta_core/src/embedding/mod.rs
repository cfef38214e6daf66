// @awa-component: EMB-EmbeddingCore
//
//! Embedding generation — backends, candidate selection, retry/failover,
//! result caching, and the concurrent batch pipeline.
//!
//! # Public API
//!
//! - [`pipeline::EmbeddingPipeline`] — chunks in, ordered embeddings out
//! - [`failover::embed_with_failover`] — one logical request across the
//!   candidate list
//! - [`selector::ProviderSelector`] — strategy-driven candidate ordering
//! - [`cache::EmbeddingCache`] — fingerprint-keyed memoization with TTL
//! - [`backend::EmbeddingBackend`] — the per-provider capability trait

pub mod backend;
pub mod cache;
pub mod failover;
pub mod local;
pub mod ollama;
pub mod openai;
pub mod pipeline;
pub mod selector;

use thiserror::Error;

use crate::embedding::failover::FailureReport;

/// Errors produced anywhere in the embedding core.
///
/// Backend implementations classify failures at the transport boundary so
/// the failover governor can decide between retrying and falling through.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication rejected by provider: {0}")]
    Auth(String),

    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Upstream provider error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Request rejected by provider: {0}")]
    InvalidRequest(String),

    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("All providers failed: {0}")]
    AllProvidersFailed(FailureReport),

    #[error("Pipeline task failed: {0}")]
    Task(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl EmbeddingError {
    /// Whether another attempt against the same provider can succeed.
    ///
    /// Transient failures consume the retry budget; everything else makes
    /// the governor abandon the candidate immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::RateLimited(_) | Self::Upstream { .. }
        )
    }
}
