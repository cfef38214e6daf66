// @awa-component: EMB-OllamaBackend
//
//! Ollama embedding backend.
//!
//! Calls the Ollama API (`/api/embeddings`). Ollama accepts a single
//! prompt per request, so batching happens above this layer.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;

use super::EmbeddingError;
use super::backend::{EmbeddingBackend, classify_http_failure};

const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    embedding: Option<Vec<f64>>,
}

pub struct OllamaBackend {
    client: Client,
    name: String,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaBackend {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            client: Client::new(),
            name: config.name.clone(),
            base_url: config
                .endpoint
                .clone()
                .unwrap_or_else(|| OLLAMA_DEFAULT_BASE_URL.to_string()),
            model: config.default_embedding_model.clone(),
            dimensions: config.dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingBackend for OllamaBackend {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/api/embeddings", self.base_url);

        let resp = self
            .client
            .post(&url)
            .json(&OllamaRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| EmbeddingError::Timeout(format!("Ollama request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(classify_http_failure(&self.name, status, body));
        }

        let data: OllamaResponse = resp.json().await.map_err(|e| {
            EmbeddingError::InvalidResponse(format!("Ollama response parse error: {e}"))
        })?;

        let embedding: Vec<f32> = data
            .embedding
            .unwrap_or_default()
            .into_iter()
            .map(|v| v as f32)
            .collect();

        if embedding.len() != self.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }

        Ok(embedding)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
