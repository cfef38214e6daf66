//! Liveness probe.

use axum::Json;
use chrono::Utc;

use crate::models::HealthResponse;

/// `GET /embeddings/health` — service name, status, timestamp.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "pacta-embeddings".to_string(),
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}
