// @awa-component: EMB-BatchPipeline
//
//! Concurrent batch pipeline: chunks in, ordered embeddings out.
//!
//! Batches run sequentially; chunks within a batch run in parallel,
//! bounded by a semaphore that is independent of the batch size. Oversized
//! content is truncated at a whitespace boundary before embedding. A chunk
//! whose providers are all exhausted degrades to a zero vector instead of
//! failing the run; pipeline-level errors set the status error sentinel
//! and propagate.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ProvidersPolicy;
use crate::models::chunk::Chunk;
use crate::models::embedding::VectorEmbedding;
use crate::models::status::ERROR_PROGRESS;
use crate::status::StatusTracker;

use super::EmbeddingError;
use super::cache::EmbeddingCache;
use super::failover::{EmbeddedVector, embed_with_failover};
use super::selector::ProviderSelector;

/// Chunks per batch.
pub const BATCH_SIZE: usize = 100;

/// Truncation budget: ~6000 tokens at ~4 characters per token.
pub const MAX_CONTENT_CHARS: usize = 24_000;

/// Default cap on concurrently in-flight chunk embeddings.
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Stage labels pushed to the status tracker.
pub const STAGE_GENERATING: &str = "Generating embeddings";
pub const STAGE_COMPLETE: &str = "Embedding generation complete";
pub const STAGE_FAILED: &str = "Embedding generation failed";

/// The embedding orchestration entry point.
///
/// Cheap to clone; all state is shared. One instance serves any number of
/// concurrent `run` calls.
#[derive(Clone)]
pub struct EmbeddingPipeline {
    selector: Arc<ProviderSelector>,
    policy: ProvidersPolicy,
    cache: Arc<EmbeddingCache>,
    status: Arc<StatusTracker>,
    semaphore: Arc<Semaphore>,
}

impl EmbeddingPipeline {
    pub fn new(
        selector: Arc<ProviderSelector>,
        policy: ProvidersPolicy,
        cache: Arc<EmbeddingCache>,
        status: Arc<StatusTracker>,
    ) -> Self {
        Self {
            selector,
            policy,
            cache,
            status,
            semaphore: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENCY)),
        }
    }

    /// Override the concurrency cap (minimum 1).
    pub fn with_max_concurrency(mut self, permits: usize) -> Self {
        self.semaphore = Arc::new(Semaphore::new(permits.max(1)));
        self
    }

    /// Embed a chunk collection for one document.
    ///
    /// Returns exactly one embedding per chunk, in input order. Progress is
    /// pushed to the status tracker after every batch; failures set the
    /// error sentinel and re-raise.
    pub async fn run(
        &self,
        document_id: Uuid,
        chunks: &[Chunk],
        cancel: &CancellationToken,
    ) -> Result<Vec<VectorEmbedding>, EmbeddingError> {
        if chunks.is_empty() {
            return Err(EmbeddingError::Validation(
                "chunk list must not be empty".to_string(),
            ));
        }

        match self.run_batches(document_id, chunks, cancel).await {
            Ok(embeddings) => {
                self.status.update(document_id, STAGE_COMPLETE, 1.0, None);
                info!(%document_id, count = embeddings.len(), "embedding generation complete");
                Ok(embeddings)
            }
            Err(e) => {
                self.status
                    .update(document_id, STAGE_FAILED, ERROR_PROGRESS, Some(e.to_string()));
                Err(e)
            }
        }
    }

    async fn run_batches(
        &self,
        document_id: Uuid,
        chunks: &[Chunk],
        cancel: &CancellationToken,
    ) -> Result<Vec<VectorEmbedding>, EmbeddingError> {
        let total = chunks.len();
        let mut embeddings = Vec::with_capacity(total);
        let mut processed = 0usize;

        info!(%document_id, total, "starting embedding pipeline");

        for batch in chunks.chunks(BATCH_SIZE) {
            if cancel.is_cancelled() {
                return Err(EmbeddingError::Cancelled);
            }

            // Spawn every chunk in the batch; the semaphore bounds actual
            // backend concurrency. Task order preserves chunk order.
            let mut tasks = Vec::with_capacity(batch.len());
            for chunk in batch {
                let pipeline = self.clone();
                let chunk = chunk.clone();
                let cancel = cancel.clone();
                tasks.push(tokio::spawn(async move {
                    let _permit = pipeline
                        .semaphore
                        .acquire()
                        .await
                        .map_err(|_| EmbeddingError::Task("semaphore closed".to_string()))?;
                    pipeline.embed_chunk(&chunk, &cancel).await
                }));
            }

            for task in tasks {
                let embedding = task
                    .await
                    .map_err(|e| EmbeddingError::Task(e.to_string()))??;
                embeddings.push(embedding);
            }

            processed += batch.len();
            let progress = processed as f32 / total as f32;
            self.status
                .update(document_id, STAGE_GENERATING, progress, None);
            debug!(%document_id, processed, total, "batch complete");
        }

        Ok(embeddings)
    }

    /// Embed one chunk through cache and governor, degrading to a zero
    /// vector when every provider is exhausted.
    async fn embed_chunk(
        &self,
        chunk: &Chunk,
        cancel: &CancellationToken,
    ) -> Result<VectorEmbedding, EmbeddingError> {
        let content = truncate_content(&chunk.content, MAX_CONTENT_CHARS);

        match self.cached_embed(content, cancel).await {
            Ok(value) => Ok(VectorEmbedding::new(chunk.id, value.vector, value.model)),
            // Cancellation aborts the run rather than degrading the chunk.
            Err(EmbeddingError::Cancelled) => Err(EmbeddingError::Cancelled),
            Err(e) => {
                warn!(
                    chunk_id = %chunk.id,
                    error = %e,
                    "all providers failed for chunk, substituting zero vector"
                );
                Ok(VectorEmbedding::zero(
                    chunk.id,
                    self.selector.primary_dimensions(),
                    self.selector.primary_model(),
                ))
            }
        }
    }

    /// Embed a raw text string (no chunk linkage).
    pub async fn embed_text(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<VectorEmbedding, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::Validation(
                "text must not be blank".to_string(),
            ));
        }
        let content = truncate_content(text, MAX_CONTENT_CHARS);
        let value = self.cached_embed(content, cancel).await?;
        Ok(VectorEmbedding::new(Uuid::nil(), value.vector, value.model))
    }

    async fn cached_embed(
        &self,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<EmbeddedVector, EmbeddingError> {
        self.cache
            .get_or_compute(content, || {
                embed_with_failover(&self.selector, &self.policy, content, cancel)
            })
            .await
    }
}

/// Truncate `content` to at most `limit` characters, cutting at the last
/// whitespace boundary at or before the limit so words are not split.
/// Falls back to a hard cut when no usable whitespace exists.
pub fn truncate_content(content: &str, limit: usize) -> &str {
    let mut indices = content.char_indices();
    let Some((cut, _)) = indices.nth(limit) else {
        // At most `limit` characters already.
        return content;
    };

    let head = &content[..cut];
    match head.rfind(|c: char| c.is_whitespace()) {
        Some(ws) => {
            let trimmed = head[..ws].trim_end();
            if trimmed.is_empty() { head } else { trimmed }
        }
        None => head,
    }
}
