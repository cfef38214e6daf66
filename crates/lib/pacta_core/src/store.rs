//! Vector-storage collaborator boundary.
//!
//! The service hands finished embeddings to an external vector database;
//! this crate only depends on the capability. The in-memory implementation
//! backs development servers and tests.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::embedding::EmbeddingError;
use crate::models::embedding::VectorEmbedding;

/// Persistence collaborator consumed after a pipeline run.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Persist the embeddings produced for one document.
    async fn persist(
        &self,
        document_id: Uuid,
        embeddings: &[VectorEmbedding],
    ) -> Result<(), EmbeddingError>;

    /// Remove every embedding stored for a document.
    async fn delete_document(&self, document_id: Uuid) -> Result<(), EmbeddingError>;
}

/// In-memory store keyed by document.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    by_document: DashMap<Uuid, Vec<VectorEmbedding>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of embeddings stored for a document.
    pub fn count(&self, document_id: Uuid) -> usize {
        self.by_document
            .get(&document_id)
            .map(|e| e.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn persist(
        &self,
        document_id: Uuid,
        embeddings: &[VectorEmbedding],
    ) -> Result<(), EmbeddingError> {
        self.by_document.insert(document_id, embeddings.to_vec());
        Ok(())
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<(), EmbeddingError> {
        self.by_document.remove(&document_id);
        Ok(())
    }
}
