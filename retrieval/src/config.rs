use crate::result::RetrievalMethod;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Strategy for combining the lexical and vector rankings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionStrategy {
    /// Reciprocal Rank Fusion - position-based, robust to score scales
    ReciprocalRank,
    /// Linear combination of normalized scores
    Weighted,
}

/// Okapi BM25 parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term-frequency saturation
    #[serde(default = "default_k1")]
    pub k1: f64,

    /// Document-length normalization
    #[serde(default = "default_b")]
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: default_k1(),
            b: default_b(),
        }
    }
}

/// Configuration for the hybrid retriever
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// Fusion strategy for combining rankings
    #[serde(default = "default_fusion_strategy")]
    pub fusion_strategy: FusionStrategy,

    /// Weight for vector similarity (0.0 - 1.0); the lexical side gets the
    /// complement. Ignored under Reciprocal Rank Fusion.
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f64,

    /// RRF smoothing constant (higher = less emphasis on top ranks)
    #[serde(default = "default_rrf_k")]
    pub rrf_k: u32,

    /// Blend each chunk's ingestion-time context into its lexical score
    #[serde(default = "default_true")]
    pub enable_contextual: bool,

    /// BM25 parameters
    #[serde(default)]
    pub bm25: Bm25Params,

    /// Divisor mapping raw BM25 scores into [0, 1] for the weighted blend.
    /// Empirical: typical magnitudes on our corpora land near 10, so the
    /// capped `score / 10` keeps both signals comparable. Tune per corpus.
    #[serde(default = "default_keyword_norm_divisor")]
    pub keyword_norm_divisor: f64,

    /// Raw BM25 score above which a chunk the vector search missed is still
    /// admitted into the weighted candidate set. Empirical, tune per corpus.
    #[serde(default = "default_keyword_only_threshold")]
    pub keyword_only_threshold: f64,

    /// Optional word-per-line stopword list refreshing the bundled one.
    /// Load failures fall back to the bundled list and never fail retrieval.
    #[serde(default)]
    pub stopword_file: Option<PathBuf>,
}

fn default_fusion_strategy() -> FusionStrategy {
    FusionStrategy::ReciprocalRank
}

fn default_vector_weight() -> f64 {
    0.7
}

fn default_rrf_k() -> u32 {
    60
}

fn default_true() -> bool {
    true
}

fn default_k1() -> f64 {
    1.5
}

fn default_b() -> f64 {
    0.75
}

fn default_keyword_norm_divisor() -> f64 {
    10.0
}

fn default_keyword_only_threshold() -> f64 {
    5.0
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            fusion_strategy: default_fusion_strategy(),
            vector_weight: default_vector_weight(),
            rrf_k: default_rrf_k(),
            enable_contextual: true,
            bm25: Bm25Params::default(),
            keyword_norm_divisor: default_keyword_norm_divisor(),
            keyword_only_threshold: default_keyword_only_threshold(),
            stopword_file: None,
        }
    }
}

impl RetrieverConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.vector_weight) {
            return Err(format!(
                "vector_weight must be in [0.0, 1.0], got {}",
                self.vector_weight
            ));
        }

        if self.rrf_k == 0 {
            return Err("rrf_k must be > 0".to_string());
        }

        if self.bm25.k1 < 0.0 {
            return Err(format!("bm25.k1 must be >= 0, got {}", self.bm25.k1));
        }

        if !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(format!("bm25.b must be in [0.0, 1.0], got {}", self.bm25.b));
        }

        if self.keyword_norm_divisor <= 0.0 {
            return Err(format!(
                "keyword_norm_divisor must be > 0, got {}",
                self.keyword_norm_divisor
            ));
        }

        if self.keyword_only_threshold < 0.0 {
            return Err(format!(
                "keyword_only_threshold must be >= 0, got {}",
                self.keyword_only_threshold
            ));
        }

        Ok(())
    }

    /// Config using the weighted blend instead of RRF
    pub fn weighted(vector_weight: f64) -> Self {
        Self {
            fusion_strategy: FusionStrategy::Weighted,
            vector_weight,
            ..Default::default()
        }
    }

    /// The method tag surfaced in responses
    pub fn retrieval_method(&self) -> RetrievalMethod {
        match self.fusion_strategy {
            FusionStrategy::ReciprocalRank => RetrievalMethod::Rrf,
            FusionStrategy::Weighted => RetrievalMethod::Weighted,
        }
    }
}
