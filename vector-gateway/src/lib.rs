//! # Docsift Vector Gateway
//!
//! The boundary between the retrieval core and whatever holds the vectors.
//! The core sees one trait, [`VectorGateway`], with three operations:
//! fetch a full corpus snapshot, run a nearest-neighbour query, and list
//! collections. Two backends ship with the crate:
//!
//! - [`RemoteGateway`]: a proxy for a queue-mediated vector service. Requests
//!   are JSON envelopes matched to responses by correlation id, with a
//!   bounded wait that surfaces an explicit timeout error instead of hanging.
//! - [`LocalIndex`]: an in-process index that embeds through
//!   `docsift-embeddings` and scans with cosine distance. Useful for tooling
//!   and tests; the production deployment talks to the remote service.
//!
//! The retrieval core must behave identically against either backend.

mod error;
mod gateway;
mod local;
mod remote;
mod types;

pub use error::GatewayError;
pub use gateway::VectorGateway;
pub use local::LocalIndex;
pub use remote::{
    ChannelTransport, DEFAULT_REQUEST_TIMEOUT, RemoteGateway, Transport, WireOperation,
    WireRequest, WireResponse,
};
pub use types::{ChunkMetadata, CorpusSnapshot, DocumentChunk, QueryResponse};

/// Result type used across gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
