// @awa-component: EMB-OpenAIBackend
//
//! OpenAI embedding backend.
//!
//! Calls the OpenAI embeddings API (`/v1/embeddings`). One attempt per
//! call; retry and failover decisions live in the governor.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;

use super::EmbeddingError;
use super::backend::{EmbeddingBackend, classify_http_failure};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/embeddings";

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: usize,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Deserialize)]
struct OpenAiEmbedding {
    embedding: Vec<f64>,
}

#[derive(Debug)]
pub struct OpenAiBackend {
    client: Client,
    name: String,
    api_key: String,
    endpoint: String,
    model: String,
    dimensions: usize,
}

impl OpenAiBackend {
    pub fn new(config: &ProviderConfig) -> Result<Self, EmbeddingError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            EmbeddingError::Config(format!("provider '{}' requires an API key", config.name))
        })?;
        Ok(Self {
            client: Client::new(),
            name: config.name.clone(),
            api_key,
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| OPENAI_API_URL.to_string()),
            model: config.default_embedding_model.clone(),
            dimensions: config.dimensions,
        })
    }
}

#[async_trait]
impl EmbeddingBackend for OpenAiBackend {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&OpenAiRequest {
                model: &self.model,
                input: text,
                dimensions: self.dimensions,
            })
            .send()
            .await
            // Transport failures (connect, timeout) are transient.
            .map_err(|e| EmbeddingError::Timeout(format!("OpenAI request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(classify_http_failure(&self.name, status, body));
        }

        let data: OpenAiResponse = resp.json().await.map_err(|e| {
            EmbeddingError::InvalidResponse(format!("OpenAI response parse error: {e}"))
        })?;

        let embedding: Vec<f32> = data
            .data
            .into_iter()
            .next()
            .ok_or_else(|| {
                EmbeddingError::InvalidResponse("OpenAI returned empty data array".to_string())
            })?
            .embedding
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
