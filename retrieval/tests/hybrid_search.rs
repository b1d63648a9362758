use async_trait::async_trait;
use docsift_retrieval::{
    FusionStrategy, HybridRetriever, RetrievalMethod, RetrievalResponse, RetrieverConfig,
};
use docsift_vector_gateway::{
    ChunkMetadata, CorpusSnapshot, DocumentChunk, GatewayError, QueryResponse, VectorGateway,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Gateway stub with canned snapshot and vector results.
#[derive(Default)]
struct StubGateway {
    collections: Vec<String>,
    snapshot: CorpusSnapshot,
    vector_ids: Vec<String>,
    vector_distances: Vec<f64>,
    fail_get_all: bool,
    fail_query: bool,
    requested_n: Arc<AtomicUsize>,
}

impl StubGateway {
    fn new(chunks: &[DocumentChunk]) -> Self {
        Self {
            collections: vec!["alpha_pdf_content".to_string()],
            snapshot: CorpusSnapshot::from_chunks(chunks),
            ..Default::default()
        }
    }

    fn with_vector_results(mut self, ids: &[&str], distances: &[f64]) -> Self {
        self.vector_ids = ids.iter().map(|id| (*id).to_string()).collect();
        self.vector_distances = distances.to_vec();
        self
    }
}

#[async_trait]
impl VectorGateway for StubGateway {
    async fn get_all(&self, _collection: &str) -> Result<CorpusSnapshot, GatewayError> {
        if self.fail_get_all {
            return Err(GatewayError::Transport("stub corpus failure".to_string()));
        }
        Ok(self.snapshot.clone())
    }

    async fn query(
        &self,
        _collection: &str,
        _query_text: &str,
        n_results: usize,
    ) -> Result<QueryResponse, GatewayError> {
        if self.fail_query {
            return Err(GatewayError::Transport("stub query failure".to_string()));
        }
        self.requested_n.store(n_results, Ordering::SeqCst);

        let ids = self.vector_ids.clone();
        let placeholder = vec![String::new(); ids.len()];
        let metadatas = vec![ChunkMetadata::default(); ids.len()];
        Ok(QueryResponse {
            ids: vec![ids],
            documents: vec![placeholder],
            metadatas: vec![metadatas],
            distances: vec![self.vector_distances.clone()],
        })
    }

    async fn list_collections(&self) -> Result<Vec<String>, GatewayError> {
        Ok(self.collections.clone())
    }
}

fn power_corpus() -> Vec<DocumentChunk> {
    vec![
        DocumentChunk::new("c1", "power grid analysis"),
        DocumentChunk::new("c2", "cooking recipe book"),
        DocumentChunk::new("c3", "electrical power systems"),
    ]
}

fn result_ids(response: &RetrievalResponse) -> Vec<&str> {
    response.results().iter().map(|r| r.id.as_str()).collect()
}

#[tokio::test]
async fn test_weighted_fusion_ranks_vector_and_keyword_agreement_first() {
    let gateway =
        StubGateway::new(&power_corpus()).with_vector_results(&["c1", "c3"], &[0.1, 0.3]);
    let retriever = HybridRetriever::open(gateway, "alpha", RetrieverConfig::weighted(0.7))
        .await
        .unwrap();

    let response = retriever.retrieve("power grid", 5).await;

    // c1 agrees across both signals and wins; c2 never reaches the
    // candidate set, its keyword score being far below the admission
    // threshold.
    assert_eq!(result_ids(&response), vec!["c1", "c3"]);

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["status"], "success");
    assert_eq!(value["retrieval_method"], "weighted");
    assert_eq!(value["vector_weight"], 0.7);
    assert_eq!(value["rrf_k"], serde_json::Value::Null);
    assert_eq!(value["count"], 2);
}

#[tokio::test]
async fn test_rrf_fusion_ranks_all_candidates() {
    let gateway =
        StubGateway::new(&power_corpus()).with_vector_results(&["c1", "c3"], &[0.1, 0.3]);
    let retriever = HybridRetriever::open(gateway, "alpha", RetrieverConfig::default())
        .await
        .unwrap();

    let response = retriever.retrieve("power grid", 5).await;

    // RRF admits every chunk either ranking saw; c1 leads on both.
    let ids = result_ids(&response);
    assert_eq!(ids[0], "c1");
    assert_eq!(ids.len(), 3);

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["retrieval_method"], "rrf");
    assert_eq!(value["rrf_k"], 60);
    assert_eq!(value["vector_weight"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_higher_combined_score_never_has_higher_distance() {
    let gateway =
        StubGateway::new(&power_corpus()).with_vector_results(&["c1", "c3"], &[0.1, 0.3]);
    let retriever = HybridRetriever::open(gateway, "alpha", RetrieverConfig::default())
        .await
        .unwrap();

    let response = retriever.retrieve("power grid", 5).await;
    let results = response.results();
    assert!(results.len() > 1);
    for pair in results.windows(2) {
        assert!(pair[0].combined_score >= pair[1].combined_score);
        assert!(pair[0].distance <= pair[1].distance);
    }
}

#[tokio::test]
async fn test_empty_corpus_is_a_successful_empty_response() {
    let gateway = StubGateway::new(&[]);
    let retriever = HybridRetriever::open(gateway, "alpha", RetrieverConfig::default())
        .await
        .unwrap();

    let response = retriever.retrieve("power grid", 5).await;

    assert!(response.is_success());
    assert_eq!(response.count(), 0);
    assert!(response.results().is_empty());
}

#[tokio::test]
async fn test_corpus_fetch_failure_degrades_to_empty_success() {
    let mut gateway =
        StubGateway::new(&power_corpus()).with_vector_results(&["c1"], &[0.1]);
    gateway.fail_get_all = true;

    let retriever = HybridRetriever::open(gateway, "alpha", RetrieverConfig::default())
        .await
        .unwrap();
    let response = retriever.retrieve("power grid", 5).await;

    assert!(response.is_success());
    assert_eq!(response.count(), 0);
}

#[tokio::test]
async fn test_vector_failure_degrades_to_lexical_only() {
    let mut gateway =
        StubGateway::new(&power_corpus()).with_vector_results(&["c3"], &[0.1]);
    gateway.fail_query = true;

    let retriever = HybridRetriever::open(gateway, "alpha", RetrieverConfig::default())
        .await
        .unwrap();
    let response = retriever.retrieve("power grid", 5).await;

    // Only the BM25 signal remains; the chunk matching the rare query term
    // leads.
    assert!(response.is_success());
    assert_eq!(result_ids(&response)[0], "c1");
}

#[tokio::test]
async fn test_vector_query_oversamples_within_corpus_bounds() {
    // top_k * 2 = 10 exceeds the 3-chunk corpus; the request is clamped.
    let gateway =
        StubGateway::new(&power_corpus()).with_vector_results(&["c1", "c3"], &[0.1, 0.3]);
    let probe = gateway.requested_n.clone();
    let retriever = HybridRetriever::open(gateway, "alpha", RetrieverConfig::default())
        .await
        .unwrap();
    let _ = retriever.retrieve("power grid", 5).await;
    assert_eq!(probe.load(Ordering::SeqCst), 3);

    // Small top_k oversamples by 2x.
    let gateway =
        StubGateway::new(&power_corpus()).with_vector_results(&["c1"], &[0.1]);
    let probe = gateway.requested_n.clone();
    let retriever = HybridRetriever::open(gateway, "alpha", RetrieverConfig::default())
        .await
        .unwrap();
    let _ = retriever.retrieve("power grid", 1).await;
    assert_eq!(probe.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_zero_top_k_is_an_error_envelope() {
    let gateway = StubGateway::new(&power_corpus());
    let retriever = HybridRetriever::open(gateway, "alpha", RetrieverConfig::default())
        .await
        .unwrap();

    let response = retriever.retrieve("power grid", 0).await;
    assert!(!response.is_success());

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["status"], "error");
    assert!(value["error"].as_str().unwrap().contains("top_k"));
}

#[tokio::test]
async fn test_collection_prefix_fallback() {
    let mut gateway = StubGateway::new(&power_corpus());
    gateway.collections = vec![
        "beta_pdf_content".to_string(),
        "alpha_reports".to_string(),
    ];

    let retriever = HybridRetriever::open(gateway, "alpha", RetrieverConfig::default())
        .await
        .unwrap();
    assert_eq!(retriever.collection(), "alpha_reports");
}

#[tokio::test]
async fn test_unknown_project_fails_open_with_distinct_error() {
    let mut gateway = StubGateway::new(&power_corpus());
    gateway.collections = vec!["beta_pdf_content".to_string()];

    let result = HybridRetriever::open(gateway, "alpha", RetrieverConfig::default()).await;
    assert!(result.is_err());
    assert!(
        result
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default()
            .contains("No collections found for project: alpha")
    );
}

#[tokio::test]
async fn test_result_text_is_cleaned_and_page_marked() {
    let separator = "=".repeat(80);
    let raw = format!(
        "{separator}\nContent Type: text\nPage Number: 4\n{separator}\n\n\
         Substation load limits.\n\n\n\nSee appendix."
    );
    let metadata = ChunkMetadata {
        page_number: Some(4),
        pdf_filename: Some("grid_report.pdf".to_string()),
        ..Default::default()
    };
    let chunks = vec![DocumentChunk::with_metadata("c1", raw, metadata)];
    let gateway = StubGateway::new(&chunks).with_vector_results(&["c1"], &[0.1]);

    let retriever = HybridRetriever::open(gateway, "alpha", RetrieverConfig::default())
        .await
        .unwrap();
    let response = retriever.retrieve("substation load", 5).await;

    let results = response.results();
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].text,
        "[Page 4] Substation load limits.\n\nSee appendix."
    );
    assert_eq!(results[0].filename, "grid_report.pdf");
    assert_eq!(results[0].pdf_filename, "grid_report.pdf");
}

#[tokio::test]
async fn test_document_summary_is_surfaced() {
    let mut chunks = power_corpus();
    chunks[1].metadata.document_summary =
        Some("Annual grid reliability report".to_string());
    let gateway = StubGateway::new(&chunks).with_vector_results(&["c1"], &[0.1]);

    let retriever = HybridRetriever::open(gateway, "alpha", RetrieverConfig::default())
        .await
        .unwrap();
    let response = retriever.retrieve("power grid", 5).await;

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["document_summary"], "Annual grid reliability report");
}

#[tokio::test]
async fn test_contextual_mode_scores_context_terms() {
    let mut chunks = vec![
        DocumentChunk::new("c1", "section four overview"),
        DocumentChunk::new("c2", "cooling system details"),
        DocumentChunk::new("c3", "site access notes"),
    ];
    chunks[0].metadata.context = Some("turbine assembly chapter".to_string());
    let gateway = StubGateway::new(&chunks).with_vector_results(&["c2"], &[0.2]);

    let retriever = HybridRetriever::open(gateway, "alpha", RetrieverConfig::default())
        .await
        .unwrap();
    let response = retriever.retrieve("turbine", 5).await;

    let c1 = response
        .results()
        .iter()
        .find(|r| r.id == "c1")
        .expect("context match should be admitted");
    assert!(c1.keyword_score > 0.0);
    assert_eq!(c1.context, "turbine assembly chapter");

    // Same corpus with contextual retrieval off: the context no longer
    // contributes, and the result omits the snippet.
    let config = RetrieverConfig {
        enable_contextual: false,
        ..Default::default()
    };
    let gateway = StubGateway::new(&chunks).with_vector_results(&["c1"], &[0.2]);
    let retriever = HybridRetriever::open(gateway, "alpha", config).await.unwrap();
    let response = retriever.retrieve("turbine", 5).await;

    let c1 = response.results().iter().find(|r| r.id == "c1").unwrap();
    assert_eq!(c1.keyword_score, 0.0);
    assert_eq!(c1.context, "");

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["contextual_retrieval"], false);
}

#[tokio::test]
async fn test_fusion_strategy_config_roundtrip() {
    let config = RetrieverConfig {
        fusion_strategy: FusionStrategy::Weighted,
        vector_weight: 0.5,
        ..Default::default()
    };
    let gateway = StubGateway::new(&power_corpus());
    let retriever = HybridRetriever::open(gateway, "alpha", config).await.unwrap();

    let response = retriever.retrieve("power", 5).await;
    for result in response.results() {
        assert_eq!(result.retrieval_method, RetrievalMethod::Weighted);
    }
}
