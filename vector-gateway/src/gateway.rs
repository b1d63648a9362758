use crate::Result;
use crate::types::{CorpusSnapshot, QueryResponse};
use async_trait::async_trait;

/// Interface every vector-store backend must satisfy.
///
/// The retrieval core depends on this trait alone and behaves identically
/// whether the backing is an in-process index or a queue-mediated remote
/// service. Implementations return errors; degrading an error to an empty
/// structure is the caller's decision, not the gateway's.
#[async_trait]
pub trait VectorGateway: Send + Sync {
    /// Fetch every chunk in a collection as parallel arrays.
    async fn get_all(&self, collection: &str) -> Result<CorpusSnapshot>;

    /// Nearest-neighbour query, best-first by ascending distance.
    async fn query(
        &self,
        collection: &str,
        query_text: &str,
        n_results: usize,
    ) -> Result<QueryResponse>;

    /// Names of all collections the backend currently holds.
    async fn list_collections(&self) -> Result<Vec<String>>;
}
