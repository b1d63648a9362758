use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata attached to a stored chunk.
///
/// The store treats metadata as an open string-to-scalar mapping; the fields
/// the retrieval pipeline actually reads are lifted out, everything else
/// rides along in `custom`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ChunkMetadata {
    /// Page the chunk was extracted from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<i64>,

    /// Position of the chunk within its document, used as a page fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<i64>,

    /// Source document filename
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_filename: Option<String>,

    /// Contextual snippet generated at ingestion time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Whole-document summary, duplicated onto chunks at ingestion time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_summary: Option<String>,

    /// Remaining metadata fields
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

/// One retrievable unit of text, owned by the vector store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentChunk {
    /// Unique id, stable across stores
    pub id: String,

    /// Raw chunk content
    pub text: String,

    /// Attached metadata
    #[serde(default)]
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    /// Create a new chunk with empty metadata
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: ChunkMetadata::default(),
        }
    }

    /// Create a new chunk with metadata
    pub fn with_metadata(
        id: impl Into<String>,
        text: impl Into<String>,
        metadata: ChunkMetadata,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata,
        }
    }
}

/// Full-corpus snapshot for one collection, as parallel arrays.
///
/// `metadatas` entries may be `None` for chunks stored without metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CorpusSnapshot {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub metadatas: Vec<Option<ChunkMetadata>>,
}

impl CorpusSnapshot {
    /// Number of chunks in the snapshot
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the snapshot holds no chunks
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Build a snapshot from owned chunks
    pub fn from_chunks(chunks: &[DocumentChunk]) -> Self {
        Self {
            ids: chunks.iter().map(|c| c.id.clone()).collect(),
            documents: chunks.iter().map(|c| c.text.clone()).collect(),
            metadatas: chunks.iter().map(|c| Some(c.metadata.clone())).collect(),
        }
    }
}

/// Nearest-neighbour results, best-first by ascending distance.
///
/// The outer vectors wrap exactly one inner ranked list, consistent with a
/// single-query batch API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResponse {
    #[serde(default)]
    pub ids: Vec<Vec<String>>,
    #[serde(default)]
    pub documents: Vec<Vec<String>>,
    #[serde(default)]
    pub metadatas: Vec<Vec<ChunkMetadata>>,
    #[serde(default)]
    pub distances: Vec<Vec<f64>>,
}

impl Default for QueryResponse {
    fn default() -> Self {
        Self {
            ids: vec![Vec::new()],
            documents: vec![Vec::new()],
            metadatas: vec![Vec::new()],
            distances: vec![Vec::new()],
        }
    }
}

impl QueryResponse {
    /// The single ranked id list (empty when the response is empty or malformed)
    pub fn ranked_ids(&self) -> &[String] {
        self.ids.first().map(Vec::as_slice).unwrap_or_default()
    }

    /// The single ranked distance list
    pub fn ranked_distances(&self) -> &[f64] {
        self.distances.first().map(Vec::as_slice).unwrap_or_default()
    }
}
