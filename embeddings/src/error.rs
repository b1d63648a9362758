use thiserror::Error;

/// Errors that can occur while talking to the embedding service
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Failed to construct the RPC client
    #[error("Failed to initialize embedding client: {0}")]
    ClientInitialization(String),

    /// The embedding service rejected or failed the request
    #[error("Embedding request failed: {0}")]
    RequestFailed(String),

    /// The service answered with an unusable payload
    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),

    /// Invalid input provided to the client
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Other errors
    #[error("Embedding error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        EmbeddingError::RequestFailed(err.to_string())
    }
}
