//! Vector embedding model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fixed-dimension vector produced for one chunk by one backend model.
///
/// Created exactly once per chunk per pipeline run; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorEmbedding {
    pub id: Uuid,
    /// Owning chunk. Nil for embeddings of raw text without a chunk.
    pub chunk_id: Uuid,
    pub vector: Vec<f32>,
    /// Identifier of the model that produced (or would have produced) the vector.
    pub model: String,
    pub created_at: DateTime<Utc>,
}

impl VectorEmbedding {
    /// Build a fresh embedding for a chunk.
    pub fn new(chunk_id: Uuid, vector: Vec<f32>, model: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            chunk_id,
            vector,
            model: model.into(),
            created_at: Utc::now(),
        }
    }

    /// Zero-valued placeholder used when every provider failed for a chunk.
    pub fn zero(chunk_id: Uuid, dimensions: usize, model: impl Into<String>) -> Self {
        Self::new(chunk_id, vec![0.0; dimensions], model)
    }

    /// Whether this is a zero-vector placeholder.
    pub fn is_zero(&self) -> bool {
        self.vector.iter().all(|v| *v == 0.0)
    }
}
