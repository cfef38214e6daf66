//! Document chunk model.
//!
//! Chunks are produced by the external document-parsing collaborator and
//! are read-only to this crate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bounded unit of contract text to be embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub id: Uuid,
    /// Owning document.
    pub document_id: Uuid,
    /// Raw text content.
    pub content: String,
    /// Position within the document's chunk sequence.
    #[serde(default)]
    pub sequence: i32,
    /// Character span within the source document.
    #[serde(default)]
    pub start_offset: usize,
    #[serde(default)]
    pub end_offset: usize,
    /// Semantic tag assigned by the parser (e.g. "clause", "definition").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_kind: Option<String>,
    /// Free-form parser metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}
