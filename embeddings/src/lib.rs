//! # Docsift Embeddings
//!
//! Client for the external embedding service used by docsift. Embedding
//! generation is not performed in-process; this crate speaks a small JSON
//! RPC (OpenAI-style `/embeddings` shape) to whatever service the deployment
//! points it at.
//!
//! ## Features
//!
//! - Batch embedding with configurable batch size
//! - Request timeout per RPC call
//! - Dimension validation on every response
//!
//! ## Example
//!
//! ```no_run
//! use docsift_embeddings::{Embedder, EmbeddingConfig, HttpEmbeddingClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EmbeddingConfig {
//!         endpoint: "http://localhost:8100/embeddings".to_string(),
//!         ..Default::default()
//!     };
//!     let client = HttpEmbeddingClient::new(config)?;
//!     let vectors = client.embed(&["power grid analysis".to_string()]).await?;
//!     println!("Generated {} embeddings", vectors.len());
//!     Ok(())
//! }
//! ```

mod client;
mod error;

pub use client::{Embedder, EmbeddingConfig, HttpEmbeddingClient};
pub use error::EmbeddingError;

/// Default embedding dimension (text-embedding-3-small).
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;
