use crate::bm25;
use crate::config::RetrieverConfig;
use crate::error::{Result, RetrievalError};
use crate::format;
use crate::fusion::{FusionEngine, FusionInputs};
use crate::result::{RetrievalMethod, RetrievalResponse};
use crate::tokenize::StopwordFilter;
use docsift_vector_gateway::{CorpusSnapshot, QueryResponse, VectorGateway};
use log::{debug, info, warn};
use std::collections::HashMap;

/// Hybrid retrieval engine over one collection.
///
/// Stateless with respect to the corpus: every `retrieve` call fetches a
/// fresh snapshot, so concurrent calls never share mutable state (and may
/// observe different snapshots of an actively-ingesting collection).
pub struct HybridRetriever<G: VectorGateway> {
    gateway: G,
    collection: String,
    config: RetrieverConfig,
    stopwords: StopwordFilter,
    fusion: FusionEngine,
}

impl<G: VectorGateway> HybridRetriever<G> {
    /// Bind a retriever to a project's collection.
    ///
    /// Prefers `{project}_pdf_content`; when that collection does not exist,
    /// falls back to the first collection named with the project prefix.
    pub async fn open(gateway: G, project_name: &str, config: RetrieverConfig) -> Result<Self> {
        config.validate().map_err(RetrievalError::InvalidConfig)?;

        let collection = resolve_collection(&gateway, project_name).await?;
        info!("Hybrid retriever bound to collection '{collection}'");

        let stopwords = StopwordFilter::load(config.stopword_file.as_deref());
        let fusion = FusionEngine::new(&config);

        Ok(Self {
            gateway,
            collection,
            config,
            stopwords,
            fusion,
        })
    }

    /// The resolved collection name
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The retriever configuration
    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Retrieve the top-K chunks for a query.
    ///
    /// Never returns an error: any failure is folded into an
    /// `{status: "error"}` envelope so callers treat it as data.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> RetrievalResponse {
        match self.retrieve_inner(query, top_k).await {
            Ok(response) => response,
            Err(error) => {
                warn!("Retrieval failed: {error}");
                RetrievalResponse::Error {
                    error: error.to_string(),
                }
            }
        }
    }

    async fn retrieve_inner(&self, query: &str, top_k: usize) -> Result<RetrievalResponse> {
        if top_k == 0 {
            return Err(RetrievalError::InvalidQuery("top_k must be > 0".into()));
        }

        debug!(
            "retrieve called with query '{query}', strategy {:?}",
            self.config.fusion_strategy
        );

        // Fresh snapshot every call. A failed fetch degrades to an empty
        // corpus, which flows through as an empty success, not an error.
        let snapshot = match self.gateway.get_all(&self.collection).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!("Corpus fetch failed, degrading to empty corpus: {error}");
                CorpusSnapshot::default()
            }
        };
        debug!("Fetched {} chunks from '{}'", snapshot.len(), self.collection);

        // Oversample the vector side so fusion has candidates to rerank. The
        // request size depends on the corpus size, hence the sequential
        // issue order. A failed query degrades to lexical-only ranking.
        let vector = if snapshot.is_empty() {
            QueryResponse::default()
        } else {
            let n_results = (top_k * 2).clamp(1, snapshot.len());
            match self.gateway.query(&self.collection, query, n_results).await {
                Ok(response) => response,
                Err(error) => {
                    warn!("Vector query failed, falling back to lexical-only ranking: {error}");
                    QueryResponse::default()
                }
            }
        };
        debug!("Vector search returned {} candidates", vector.ranked_ids().len());

        let contexts: Option<Vec<String>> =
            if self.config.enable_contextual && !snapshot.metadatas.is_empty() {
                Some(
                    snapshot
                        .metadatas
                        .iter()
                        .map(|metadata| {
                            metadata
                                .as_ref()
                                .and_then(|m| m.context.clone())
                                .unwrap_or_default()
                        })
                        .collect(),
                )
            } else {
                None
            };

        let keyword_scores = bm25::keyword_scores(
            self.config.bm25,
            &self.stopwords,
            query,
            &snapshot.documents,
            &snapshot.ids,
            contexts.as_deref(),
        );

        let document_summary = snapshot
            .metadatas
            .iter()
            .flatten()
            .find_map(|metadata| metadata.document_summary.clone());

        let candidates = self.fusion.fuse(&FusionInputs {
            vector_ids: vector.ranked_ids(),
            vector_distances: vector.ranked_distances(),
            keyword_scores: &keyword_scores,
            corpus_size: snapshot.len(),
            top_k,
        });

        let index_by_id: HashMap<&str, usize> = snapshot
            .ids
            .iter()
            .enumerate()
            .map(|(position, id)| (id.as_str(), position))
            .collect();

        let retrieval_method = self.config.retrieval_method();
        let mut results = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            // Vector results can reference chunks this snapshot no longer
            // holds (concurrent re-ingestion); skip them.
            let Some(&position) = index_by_id.get(candidate.id.as_str()) else {
                continue;
            };
            let metadata = snapshot
                .metadatas
                .get(position)
                .cloned()
                .flatten()
                .unwrap_or_default();

            results.push(format::assemble_result(
                &candidate.id,
                &snapshot.documents[position],
                metadata,
                candidate.distance,
                keyword_scores
                    .get(&candidate.id)
                    .copied()
                    .unwrap_or_default(),
                candidate.combined_score,
                retrieval_method,
                self.config.enable_contextual,
            ));
        }

        info!(
            "Retrieved {} results from '{}' via {retrieval_method:?}",
            results.len(),
            self.collection
        );

        Ok(RetrievalResponse::Success {
            query: query.to_string(),
            count: results.len(),
            results,
            document_summary,
            collection: self.collection.clone(),
            contextual_retrieval: self.config.enable_contextual,
            retrieval_method,
            rrf_k: (retrieval_method == RetrievalMethod::Rrf).then_some(self.config.rrf_k),
            vector_weight: (retrieval_method == RetrievalMethod::Weighted)
                .then_some(self.config.vector_weight),
        })
    }
}

async fn resolve_collection<G: VectorGateway>(gateway: &G, project_name: &str) -> Result<String> {
    let preferred = format!("{project_name}_pdf_content");
    let names = gateway.list_collections().await?;

    if names.contains(&preferred) {
        return Ok(preferred);
    }

    let prefix = format!("{project_name}_");
    names
        .into_iter()
        .find(|name| name.starts_with(&prefix))
        .ok_or_else(|| RetrievalError::CollectionNotFound(project_name.to_string()))
}
