// @awa-component: EMB-EmbeddingEndpoints
//
//! Embedding generation endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::{error, info};
use uuid::Uuid;

use pacta_core::models::chunk::Chunk;
use pacta_core::models::embedding::VectorEmbedding;
use pacta_core::models::status::ProcessingStatus;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{BatchAccepted, SingleTextRequest};

/// `POST /embeddings/generate` — embed a chunk list synchronously.
///
/// Returns one embedding per chunk, in input order.
pub async fn generate_handler(
    State(state): State<AppState>,
    Json(chunks): Json<Vec<Chunk>>,
) -> AppResult<Json<Vec<VectorEmbedding>>> {
    if chunks.is_empty() {
        return Err(AppError::Validation(
            "chunk list must not be empty".to_string(),
        ));
    }

    let document_id = chunks[0].document_id;
    let cancel = state.shutdown.child_token();
    let embeddings = state.pipeline.run(document_id, &chunks, &cancel).await?;
    Ok(Json(embeddings))
}

/// `POST /embeddings/generate-single` — embed one raw text string.
pub async fn generate_single_handler(
    State(state): State<AppState>,
    Json(body): Json<SingleTextRequest>,
) -> AppResult<Json<VectorEmbedding>> {
    if body.text.trim().is_empty() {
        return Err(AppError::Validation("text must not be blank".to_string()));
    }

    let cancel = state.shutdown.child_token();
    let embedding = state.pipeline.embed_text(&body.text, &cancel).await?;
    Ok(Json(embedding))
}

/// `POST /embeddings/batch-process/{documentId}` — start the pipeline in
/// the background and acknowledge with 202.
///
/// The response only claims acceptance; completion is observable through
/// the status endpoint. Results are handed to the vector-store
/// collaborator on success.
pub async fn batch_process_handler(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Json(chunks): Json<Vec<Chunk>>,
) -> AppResult<(StatusCode, Json<BatchAccepted>)> {
    if chunks.is_empty() {
        return Err(AppError::Validation(
            "chunk list must not be empty".to_string(),
        ));
    }

    info!(%document_id, chunks = chunks.len(), "accepted batch processing request");

    let pipeline = state.pipeline.clone();
    let store = state.store.clone();
    let cancel = state.shutdown.child_token();
    tokio::spawn(async move {
        match pipeline.run(document_id, &chunks, &cancel).await {
            Ok(embeddings) => {
                if let Err(e) = store.persist(document_id, &embeddings).await {
                    error!(%document_id, error = %e, "failed to persist embeddings");
                }
            }
            Err(e) => {
                // Status already carries the error sentinel.
                error!(%document_id, error = %e, "background embedding pipeline failed");
            }
        }
    });

    Ok((StatusCode::ACCEPTED, Json(BatchAccepted { document_id })))
}

/// `GET /embeddings/status/{documentId}` — current processing status.
///
/// Never fails; unseen documents report "Not started".
pub async fn status_handler(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Json<ProcessingStatus> {
    Json(state.status.get(document_id))
}
