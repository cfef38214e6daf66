// @awa-component: EMB-LocalBackend
//
//! Local deterministic embedding backend.
//!
//! Seeds an FNV-1a hash from the input text and fills the vector with an
//! xorshift PRNG, producing repeatable embeddings with no external
//! dependencies — useful for tests and offline development.

use async_trait::async_trait;

use crate::config::ProviderConfig;

use super::EmbeddingError;
use super::backend::EmbeddingBackend;

/// Deterministic vector for a text: FNV-1a seed, xorshift fill, values in `[-1, 1]`.
pub fn deterministic_vector(text: &str, dimensions: usize) -> Vec<f32> {
    let mut seed: u32 = 2_166_136_261;
    for byte in text.bytes() {
        seed ^= byte as u32;
        seed = seed.wrapping_mul(16_777_619);
    }

    let mut vector = Vec::with_capacity(dimensions);
    let mut x = seed;
    for _ in 0..dimensions {
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        let normalized = (x as f64) / (u32::MAX as f64);
        vector.push((normalized * 2.0 - 1.0) as f32);
    }

    vector
}

pub struct LocalBackend {
    name: String,
    model: String,
    dimensions: usize,
}

impl LocalBackend {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            name: config.name.clone(),
            model: config.default_embedding_model.clone(),
            dimensions: config.dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingBackend for LocalBackend {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(deterministic_vector(text, self.dimensions))
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
