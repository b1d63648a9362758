use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No correlated response arrived within the bounded wait
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The underlying transport failed or the remote service reported an error
    #[error("Transport error: {0}")]
    Transport(String),

    /// The named collection does not exist
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// A payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Embedding error from the local index backend
    #[error("Embedding error: {0}")]
    Embedding(#[from] docsift_embeddings::EmbeddingError),

    /// The transport has shut down
    #[error("Gateway transport closed")]
    Closed,
}
