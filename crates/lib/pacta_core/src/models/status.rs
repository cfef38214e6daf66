//! Document processing status model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress sentinel for a failed pipeline run.
pub const ERROR_PROGRESS: f32 = -1.0;

/// Stage reported for documents the pipeline has never seen.
pub const STAGE_NOT_STARTED: &str = "Not started";

/// Latest processing status for one document. Last write wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStatus {
    pub document_id: Uuid,
    /// Human-readable stage label.
    pub stage: String,
    /// Fraction complete in `[0.0, 1.0]`, or [`ERROR_PROGRESS`] on failure.
    pub progress: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ProcessingStatus {
    /// Default status for a document with no recorded progress.
    pub fn not_started(document_id: Uuid) -> Self {
        Self {
            document_id,
            stage: STAGE_NOT_STARTED.to_string(),
            progress: 0.0,
            message: None,
            updated_at: Utc::now(),
        }
    }

    /// Whether the status carries the error sentinel.
    pub fn is_error(&self) -> bool {
        self.progress < 0.0
    }
}
