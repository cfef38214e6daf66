// @awa-component: EMB-BackendDispatch
//
//! Backend capability trait and configuration-time dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::config::{ProviderConfig, ProviderKind};

use super::EmbeddingError;
use super::local::LocalBackend;
use super::ollama::OllamaBackend;
use super::openai::OpenAiBackend;

/// The single capability every provider kind implements.
///
/// Implementations make ONE attempt per call and classify failures; the
/// retry budget belongs to the failover governor.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embed a single text into a vector of [`Self::dimensions`] floats.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Configured provider name (unique within the registry).
    fn name(&self) -> &str;

    /// Model identifier stamped onto produced embeddings.
    fn model(&self) -> &str;

    /// Expected vector dimensionality.
    fn dimensions(&self) -> usize;
}

/// Build a backend client for a provider configuration.
///
/// The kind tag is resolved here, at configuration-load time — there is no
/// runtime type switch on the request path.
pub fn create_backend(
    config: &ProviderConfig,
) -> Result<Arc<dyn EmbeddingBackend>, EmbeddingError> {
    match config.kind {
        ProviderKind::OpenAi => Ok(Arc::new(OpenAiBackend::new(config)?)),
        ProviderKind::Ollama => Ok(Arc::new(OllamaBackend::new(config))),
        ProviderKind::Local => Ok(Arc::new(LocalBackend::new(config))),
    }
}

/// Map an HTTP failure status to the retry classification the governor
/// acts on.
pub(crate) fn classify_http_failure(
    provider: &str,
    status: StatusCode,
    body: String,
) -> EmbeddingError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            EmbeddingError::Auth(format!("{provider}: {status} {body}"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            EmbeddingError::RateLimited(format!("{provider}: {status} {body}"))
        }
        StatusCode::NOT_FOUND => {
            EmbeddingError::UnsupportedModel(format!("{provider}: {status} {body}"))
        }
        s if s.is_server_error() => EmbeddingError::Upstream {
            status: s.as_u16(),
            message: format!("{provider}: {body}"),
        },
        _ => EmbeddingError::InvalidRequest(format!("{provider}: {status} {body}")),
    }
}
