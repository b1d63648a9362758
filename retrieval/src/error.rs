use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] docsift_vector_gateway::GatewayError),

    #[error("No collections found for project: {0}")]
    CollectionNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
