use crate::Result;
use crate::error::GatewayError;
use crate::gateway::VectorGateway;
use crate::types::{CorpusSnapshot, QueryResponse};
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

/// Default bounded wait for a correlated response
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Operations understood by the remote vector service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireOperation {
    Query,
    GetAll,
    ListCollections,
}

/// Request envelope published to the vector service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRequest {
    pub correlation_id: String,
    pub operation: WireOperation,
    pub collection: String,
    pub query_text: String,
    pub n_results: usize,
}

impl WireRequest {
    fn new(operation: WireOperation, collection: &str, query_text: &str, n_results: usize) -> Self {
        Self {
            correlation_id: Uuid::new_v4().to_string(),
            operation,
            collection: collection.to_string(),
            query_text: query_text.to_string(),
            n_results,
        }
    }
}

/// Response envelope from the vector service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireResponse {
    pub correlation_id: String,
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub collections: Option<Vec<String>>,
}

impl WireResponse {
    fn into_result(self) -> Result<WireResponse> {
        if self.status == "success" {
            Ok(self)
        } else {
            Err(GatewayError::Transport(
                self.error.unwrap_or_else(|| "unknown remote error".to_string()),
            ))
        }
    }
}

/// Duplex message transport carrying serialized envelopes.
///
/// Implementations publish to the service's request queue and pull from the
/// shared response queue. Correlation is the gateway's job, not the
/// transport's: `recv` returns whatever arrives next.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, payload: Vec<u8>) -> Result<()>;
    async fn recv(&self) -> Result<Vec<u8>>;
}

/// In-process transport over tokio channels.
///
/// Backs the tests and any deployment that runs the vector service in the
/// same process; a broker-backed transport implements [`Transport`] the same
/// way against its client library.
pub struct ChannelTransport {
    outgoing: mpsc::Sender<Vec<u8>>,
    incoming: Mutex<mpsc::Receiver<Vec<u8>>>,
}

impl ChannelTransport {
    /// Build a transport from an outgoing sender and incoming receiver pair.
    pub fn new(outgoing: mpsc::Sender<Vec<u8>>, incoming: mpsc::Receiver<Vec<u8>>) -> Self {
        Self {
            outgoing,
            incoming: Mutex::new(incoming),
        }
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, payload: Vec<u8>) -> Result<()> {
        self.outgoing
            .send(payload)
            .await
            .map_err(|_| GatewayError::Closed)
    }

    async fn recv(&self) -> Result<Vec<u8>> {
        let mut incoming = self.incoming.lock().await;
        incoming.recv().await.ok_or(GatewayError::Closed)
    }
}

/// Gateway proxy for a queue-mediated remote vector service.
///
/// Each logical call publishes one request envelope and blocks until the
/// response with a matching correlation id arrives or the bounded wait
/// elapses. Timeouts are surfaced as [`GatewayError::Timeout`]; there is no
/// automatic retry.
pub struct RemoteGateway<T: Transport> {
    transport: T,
    timeout: Duration,
}

impl<T: Transport> RemoteGateway<T> {
    /// Create a gateway with the default 30 second wait
    pub fn new(transport: T) -> Self {
        Self::with_timeout(transport, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a gateway with a custom bounded wait
    pub fn with_timeout(transport: T, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    async fn call(&self, request: WireRequest) -> Result<WireResponse> {
        let payload = serde_json::to_vec(&request)?;
        debug!(
            "Sending {:?} request for collection '{}' (correlation {})",
            request.operation, request.collection, request.correlation_id
        );
        self.transport.send(payload).await?;

        let wait = async {
            loop {
                let raw = self.transport.recv().await?;
                let response: WireResponse = serde_json::from_slice(&raw)?;
                if response.correlation_id == request.correlation_id {
                    return Ok(response);
                }
                // A response for an abandoned request; drop it and keep waiting.
                warn!(
                    "Discarding response with stale correlation id {}",
                    response.correlation_id
                );
            }
        };

        match tokio::time::timeout(self.timeout, wait).await {
            Ok(result) => result.and_then(WireResponse::into_result),
            Err(_) => Err(GatewayError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl<T: Transport> VectorGateway for RemoteGateway<T> {
    async fn get_all(&self, collection: &str) -> Result<CorpusSnapshot> {
        let response = self
            .call(WireRequest::new(WireOperation::GetAll, collection, "", 0))
            .await?;
        let result = response.result.unwrap_or_else(|| serde_json::json!({}));
        Ok(serde_json::from_value(result)?)
    }

    async fn query(
        &self,
        collection: &str,
        query_text: &str,
        n_results: usize,
    ) -> Result<QueryResponse> {
        let response = self
            .call(WireRequest::new(
                WireOperation::Query,
                collection,
                query_text,
                n_results,
            ))
            .await?;
        let result = response.result.unwrap_or_else(|| serde_json::json!({}));
        Ok(serde_json::from_value(result)?)
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let response = self
            .call(WireRequest::new(
                WireOperation::ListCollections,
                "system",
                "",
                0,
            ))
            .await?;
        Ok(response.collections.unwrap_or_default())
    }
}
