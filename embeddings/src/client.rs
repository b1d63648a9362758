use crate::DEFAULT_EMBEDDING_DIM;
use crate::error::EmbeddingError;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the embedding service client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Endpoint of the embedding service
    pub endpoint: String,

    /// Model name forwarded to the service
    pub model: String,

    /// Bearer token, if the service requires one
    pub api_key: Option<String>,

    /// Maximum texts per RPC call
    pub batch_size: usize,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Expected embedding dimension; responses with a different width are
    /// rejected rather than silently propagated into the vector index
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8100/embeddings".to_string(),
            model: "text-embedding-3-small".to_string(),
            api_key: None,
            batch_size: 32,
            timeout_secs: 30,
            dimension: DEFAULT_EMBEDDING_DIM,
        }
    }
}

/// Anything that can turn texts into vectors.
///
/// The retrieval core never embeds; only vector-index backends depend on
/// this trait, and tests substitute deterministic implementations.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate one embedding per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Generate a single embedding.
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let texts = [text.to_string()];
        let mut embeddings = self.embed(&texts).await?;
        embeddings
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding generated".into()))
    }

    /// Width of the vectors this embedder produces.
    fn dimension(&self) -> usize;
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedItem>,
}

#[derive(Deserialize)]
struct EmbedItem {
    index: usize,
    embedding: Vec<f32>,
}

/// HTTP client for the external embedding service
pub struct HttpEmbeddingClient {
    http: reqwest::Client,
    config: EmbeddingConfig,
}

impl HttpEmbeddingClient {
    /// Create a new client from configuration
    pub fn new(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        if config.batch_size == 0 {
            return Err(EmbeddingError::ClientInitialization(
                "batch_size must be > 0".into(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::ClientInitialization(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Get the configuration of this client
    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = EmbedRequest {
            model: &self.config.model,
            input: batch,
        };

        let mut builder = self.http.post(&self.config.endpoint).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(EmbeddingError::RequestFailed(format!(
                "embedding service returned {}",
                response.status()
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        if parsed.data.len() != batch.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                batch.len(),
                parsed.data.len()
            )));
        }

        // The service may reorder items; restore input order via index.
        let mut ordered: Vec<Option<Vec<f32>>> = vec![None; batch.len()];
        for item in parsed.data {
            if item.embedding.len() != self.config.dimension {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "expected dimension {}, got {}",
                    self.config.dimension,
                    item.embedding.len()
                )));
            }
            let slot = ordered
                .get_mut(item.index)
                .ok_or_else(|| {
                    EmbeddingError::InvalidResponse(format!("index {} out of range", item.index))
                })?;
            *slot = Some(item.embedding);
        }

        ordered
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| {
                    EmbeddingError::InvalidResponse(format!("missing embedding for index {i}"))
                })
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for HttpEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Requesting embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.config.batch_size) {
            all_embeddings.extend(self.embed_batch(batch).await?);
        }

        debug!("Received {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}
