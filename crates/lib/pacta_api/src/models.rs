//! Request/response DTO models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Structured failure envelope returned by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Body for `POST /embeddings/generate-single`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SingleTextRequest {
    pub text: String,
}

/// 202 acknowledgement for a background batch run.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAccepted {
    pub document_id: Uuid,
}

/// Liveness probe response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub service: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}
