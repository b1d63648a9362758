use docsift_vector_gateway::ChunkMetadata;
use serde::{Deserialize, Serialize};

/// Which fusion strategy produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMethod {
    Rrf,
    Weighted,
}

/// One ranked, cleaned retrieval result.
///
/// `distance` is synthesized from the combined score (min-max normalized and
/// inverted) so that lower always means better regardless of fusion strategy
/// or the backend's native metric; it is not the original vector distance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedResult {
    /// Cleaned chunk text, prefixed with a `[Page N]` marker when available
    pub text: String,

    /// Chunk metadata as stored
    pub metadata: ChunkMetadata,

    /// Presentation distance in [0, 1], lower is better
    pub distance: f64,

    /// Raw BM25 score for this chunk
    pub keyword_score: f64,

    /// Fused score this result was ranked by
    pub combined_score: f64,

    /// Chunk id
    pub id: String,

    /// Source document filename
    pub filename: String,

    /// Legacy duplicate of `filename`
    pub pdf_filename: String,

    /// Contextual snippet (empty when contextual mode is off)
    pub context: String,

    /// Fusion strategy that produced this result
    pub retrieval_method: RetrievalMethod,
}

/// Response envelope returned by `retrieve`.
///
/// Failures are data, not control flow: callers always get an envelope and
/// branch on `status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RetrievalResponse {
    Success {
        query: String,
        results: Vec<RankedResult>,
        document_summary: Option<String>,
        collection: String,
        count: usize,
        contextual_retrieval: bool,
        retrieval_method: RetrievalMethod,
        /// Set when the method is RRF, null otherwise
        rrf_k: Option<u32>,
        /// Set when the method is weighted, null otherwise
        vector_weight: Option<f64>,
    },
    Error {
        error: String,
    },
}

impl RetrievalResponse {
    /// Whether this envelope carries results
    pub fn is_success(&self) -> bool {
        matches!(self, RetrievalResponse::Success { .. })
    }

    /// The ranked results (empty for error envelopes)
    pub fn results(&self) -> &[RankedResult] {
        match self {
            RetrievalResponse::Success { results, .. } => results,
            RetrievalResponse::Error { .. } => &[],
        }
    }

    /// Number of results (0 for error envelopes)
    pub fn count(&self) -> usize {
        match self {
            RetrievalResponse::Success { count, .. } => *count,
            RetrievalResponse::Error { .. } => 0,
        }
    }
}
