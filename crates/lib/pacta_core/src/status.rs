// @awa-component: EMB-StatusTracker
//
//! Shared document-processing status map.
//!
//! Any number of concurrent pipeline runs may upsert; last write wins.
//! Callers that need monotonic progress must not run two pipelines for the
//! same document concurrently.

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::status::ProcessingStatus;

/// Concurrent document → status map. Entries are never deleted here;
/// eviction is the owner's call.
#[derive(Debug, Default)]
pub struct StatusTracker {
    statuses: DashMap<Uuid, ProcessingStatus>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic upsert of the latest status for a document.
    pub fn update(&self, document_id: Uuid, stage: &str, progress: f32, message: Option<String>) {
        self.statuses.insert(
            document_id,
            ProcessingStatus {
                document_id,
                stage: stage.to_string(),
                progress,
                message,
                updated_at: Utc::now(),
            },
        );
    }

    /// Current status for a document. Never fails: unseen documents report
    /// the "Not started" default.
    pub fn get(&self, document_id: Uuid) -> ProcessingStatus {
        self.statuses
            .get(&document_id)
            .map(|status| status.clone())
            .unwrap_or_else(|| ProcessingStatus::not_started(document_id))
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}
