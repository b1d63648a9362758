use crate::Result;
use crate::error::GatewayError;
use crate::gateway::VectorGateway;
use crate::types::{ChunkMetadata, CorpusSnapshot, DocumentChunk, QueryResponse};
use async_trait::async_trait;
use docsift_embeddings::Embedder;
use log::{debug, info};
use std::collections::HashMap;
use tokio::sync::RwLock;

struct Collection {
    chunks: Vec<DocumentChunk>,
    embeddings: Vec<Vec<f32>>,
}

/// In-process vector index.
///
/// Holds chunks and their embeddings in memory and answers queries with a
/// cosine-distance scan. Embeddings come from the external embedding service
/// via [`Embedder`]; the index itself never computes them.
pub struct LocalIndex<E: Embedder> {
    embedder: E,
    collections: RwLock<HashMap<String, Collection>>,
}

impl<E: Embedder> LocalIndex<E> {
    /// Create an empty index
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Add chunks to a collection, creating it if needed.
    ///
    /// A chunk whose id already exists in the collection replaces the stored
    /// one, keeping ids unique within the corpus.
    pub async fn add_chunks(&self, collection: &str, chunks: Vec<DocumentChunk>) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;

        let mut collections = self.collections.write().await;
        let entry = collections.entry(collection.to_string()).or_insert_with(|| {
            info!("Creating collection '{collection}'");
            Collection {
                chunks: Vec::new(),
                embeddings: Vec::new(),
            }
        });

        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            match entry.chunks.iter().position(|c| c.id == chunk.id) {
                Some(existing) => {
                    entry.chunks[existing] = chunk;
                    entry.embeddings[existing] = embedding;
                }
                None => {
                    entry.chunks.push(chunk);
                    entry.embeddings.push(embedding);
                }
            }
        }

        debug!(
            "Collection '{collection}' now holds {} chunks",
            entry.chunks.len()
        );
        Ok(())
    }

    /// Number of chunks in a collection (0 if it does not exist)
    pub async fn count(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, |c| c.chunks.len())
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 1.0;
    }
    1.0 - f64::from(dot / (mag_a * mag_b))
}

#[async_trait]
impl<E: Embedder> VectorGateway for LocalIndex<E> {
    async fn get_all(&self, collection: &str) -> Result<CorpusSnapshot> {
        let collections = self.collections.read().await;
        let stored = collections
            .get(collection)
            .ok_or_else(|| GatewayError::CollectionNotFound(collection.to_string()))?;
        Ok(CorpusSnapshot::from_chunks(&stored.chunks))
    }

    async fn query(
        &self,
        collection: &str,
        query_text: &str,
        n_results: usize,
    ) -> Result<QueryResponse> {
        let query_embedding = self.embedder.embed_single(query_text).await?;

        let collections = self.collections.read().await;
        let stored = collections
            .get(collection)
            .ok_or_else(|| GatewayError::CollectionNotFound(collection.to_string()))?;

        let mut scored: Vec<(usize, f64)> = stored
            .embeddings
            .iter()
            .enumerate()
            .map(|(i, embedding)| (i, cosine_distance(embedding, &query_embedding)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(n_results);

        let mut ids = Vec::with_capacity(scored.len());
        let mut documents = Vec::with_capacity(scored.len());
        let mut metadatas: Vec<ChunkMetadata> = Vec::with_capacity(scored.len());
        let mut distances = Vec::with_capacity(scored.len());
        for (index, distance) in scored {
            let chunk = &stored.chunks[index];
            ids.push(chunk.id.clone());
            documents.push(chunk.text.clone());
            metadatas.push(chunk.metadata.clone());
            distances.push(distance);
        }

        Ok(QueryResponse {
            ids: vec![ids],
            documents: vec![documents],
            metadatas: vec![metadatas],
            distances: vec![distances],
        })
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let collections = self.collections.read().await;
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
