/*!
# Docsift Retrieval

Hybrid retrieval engine for chunked document corpora, combining:
- **Lexical scoring** via contextual BM25 over the full corpus
- **Vector similarity** via a pluggable vector-store gateway
- **Rank fusion** by weighted blend or Reciprocal Rank Fusion (RRF)

## Architecture

```text
Query
  ├─> Corpus snapshot (gateway.get_all)
  │     └─> Contextual BM25 over every chunk
  ├─> Nearest neighbours (gateway.query, 2x oversampled)
  └─> Fusion (RRF or weighted)
        └─> Top-K
              └─> Formatting (artifact cleanup, page markers)
                    └─> Response envelope
```

## Example

```rust,no_run
use docsift_retrieval::{HybridRetriever, RetrieverConfig};
use docsift_vector_gateway::{ChannelTransport, RemoteGateway};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (tx, _service_rx) = mpsc::channel(16);
    let (_service_tx, rx) = mpsc::channel(16);
    let gateway = RemoteGateway::new(ChannelTransport::new(tx, rx));

    let retriever =
        HybridRetriever::open(gateway, "alpha", RetrieverConfig::default()).await?;
    let response = retriever.retrieve("substation maintenance schedule", 5).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
```

Errors inside `retrieve` never propagate: the response envelope carries
`status: "error"` instead, so callers treat retrieval failure as data.
*/

mod bm25;
mod config;
mod error;
mod format;
mod fusion;
mod result;
mod retriever;
mod tokenize;

pub use bm25::keyword_scores;
pub use config::{Bm25Params, FusionStrategy, RetrieverConfig};
pub use error::{Result, RetrievalError};
pub use format::clean_text_content;
pub use result::{RankedResult, RetrievalMethod, RetrievalResponse};
pub use retriever::HybridRetriever;
pub use tokenize::{StopwordFilter, tokenize};
