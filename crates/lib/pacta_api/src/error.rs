//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use pacta_core::config::ConfigError;
use pacta_core::embedding::EmbeddingError;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream provider failure: {0}")]
    Upstream(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Upstream(m) => (StatusCode::BAD_GATEWAY, "upstream_error", m.as_str()),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
            ),
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<EmbeddingError> for AppError {
    fn from(e: EmbeddingError) -> Self {
        match e {
            EmbeddingError::Validation(m) => AppError::Validation(m),
            EmbeddingError::AllProvidersFailed(report) => AppError::Upstream(report.to_string()),
            EmbeddingError::Auth(_)
            | EmbeddingError::RateLimited(_)
            | EmbeddingError::Timeout(_)
            | EmbeddingError::Upstream { .. }
            | EmbeddingError::InvalidRequest(_)
            | EmbeddingError::UnsupportedModel(_)
            | EmbeddingError::InvalidResponse(_)
            | EmbeddingError::DimensionMismatch { .. } => AppError::Upstream(e.to_string()),
            EmbeddingError::Cancelled => AppError::Internal("request cancelled".to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Internal(e.to_string())
    }
}
