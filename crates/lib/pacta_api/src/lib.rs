//! # pacta_api
//!
//! HTTP API library for Pacta.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use pacta_core::config::ProviderRegistry;
use pacta_core::embedding::EmbeddingError;
use pacta_core::embedding::cache::EmbeddingCache;
use pacta_core::embedding::pipeline::EmbeddingPipeline;
use pacta_core::embedding::selector::ProviderSelector;
use pacta_core::status::StatusTracker;
use pacta_core::store::VectorStore;

use crate::config::ApiConfig;
use crate::handlers::{embeddings, health};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<EmbeddingPipeline>,
    pub status: Arc<StatusTracker>,
    pub store: Arc<dyn VectorStore>,
    /// Root token: background pipelines run under child tokens so server
    /// shutdown aborts in-flight work.
    pub shutdown: CancellationToken,
    pub config: ApiConfig,
}

impl AppState {
    /// Wire the embedding core from a validated registry.
    pub fn build(
        registry: &ProviderRegistry,
        store: Arc<dyn VectorStore>,
        config: ApiConfig,
        shutdown: CancellationToken,
    ) -> Result<Self, EmbeddingError> {
        let selector = Arc::new(ProviderSelector::from_registry(registry)?);
        let status = Arc::new(StatusTracker::new());
        let pipeline = EmbeddingPipeline::new(
            selector,
            registry.policy().clone(),
            Arc::new(EmbeddingCache::new()),
            status.clone(),
        );
        Ok(Self {
            pipeline: Arc::new(pipeline),
            status,
            store,
            shutdown,
            config,
        })
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/embeddings/generate",
            post(embeddings::generate_handler),
        )
        .route(
            "/embeddings/generate-single",
            post(embeddings::generate_single_handler),
        )
        .route(
            "/embeddings/batch-process/{document_id}",
            post(embeddings::batch_process_handler),
        )
        .route(
            "/embeddings/status/{document_id}",
            get(embeddings::status_handler),
        )
        .route("/embeddings/health", get(health::health_handler))
        .layer(cors)
        .with_state(state)
}
