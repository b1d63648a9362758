//! Operational front door for docsift: load a corpus snapshot into the local
//! index and run hybrid searches against it. The production service talks to
//! the remote vector service instead; this binary exists for inspection and
//! smoke-testing retrieval behavior with real corpora.

use anyhow::Context;
use clap::{Parser, Subcommand};
use docsift_embeddings::{EmbeddingConfig, HttpEmbeddingClient};
use docsift_retrieval::{FusionStrategy, HybridRetriever, RetrieverConfig};
use docsift_vector_gateway::{DocumentChunk, LocalIndex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "docsift", about = "Hybrid document retrieval", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search a project's collection with a natural-language query
    Search {
        /// Query text
        query: String,

        /// Project name the collection belongs to
        #[arg(long)]
        project: String,

        /// Corpus snapshot file (JSON: collection name -> chunks)
        #[arg(long)]
        corpus: PathBuf,

        /// Number of results to return
        #[arg(long, default_value_t = 5)]
        top_k: usize,

        /// Use the weighted blend instead of Reciprocal Rank Fusion
        #[arg(long)]
        weighted: bool,

        /// Weight for vector similarity under the weighted blend
        #[arg(long, default_value_t = 0.7)]
        vector_weight: f64,

        /// RRF smoothing constant
        #[arg(long, default_value_t = 60)]
        rrf_k: u32,

        /// Disable contextual retrieval
        #[arg(long)]
        no_contextual: bool,
    },

    /// List the collections in a corpus snapshot
    Collections {
        /// Corpus snapshot file (JSON: collection name -> chunks)
        #[arg(long)]
        corpus: PathBuf,
    },
}

type CorpusFile = HashMap<String, Vec<DocumentChunk>>;

fn load_corpus(path: &Path) -> anyhow::Result<CorpusFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading corpus snapshot {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing corpus snapshot {}", path.display()))
}

fn embedding_config_from_env() -> EmbeddingConfig {
    let mut config = EmbeddingConfig::default();
    if let Ok(endpoint) = std::env::var("DOCSIFT_EMBEDDING_ENDPOINT") {
        config.endpoint = endpoint;
    }
    if let Ok(model) = std::env::var("DOCSIFT_EMBEDDING_MODEL") {
        config.model = model;
    }
    if let Ok(key) = std::env::var("DOCSIFT_EMBEDDING_API_KEY") {
        config.api_key = Some(key);
    }
    config
}

async fn build_index(corpus: CorpusFile) -> anyhow::Result<LocalIndex<HttpEmbeddingClient>> {
    let embedder = HttpEmbeddingClient::new(embedding_config_from_env())?;
    let index = LocalIndex::new(embedder);
    for (collection, chunks) in corpus {
        log::info!("Loading {} chunks into '{collection}'", chunks.len());
        index.add_chunks(&collection, chunks).await?;
    }
    Ok(index)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Search {
            query,
            project,
            corpus,
            top_k,
            weighted,
            vector_weight,
            rrf_k,
            no_contextual,
        } => {
            let index = build_index(load_corpus(&corpus)?).await?;

            let config = RetrieverConfig {
                fusion_strategy: if weighted {
                    FusionStrategy::Weighted
                } else {
                    FusionStrategy::ReciprocalRank
                },
                vector_weight,
                rrf_k,
                enable_contextual: !no_contextual,
                ..Default::default()
            };

            let retriever = HybridRetriever::open(index, &project, config).await?;
            let response = retriever.retrieve(&query, top_k).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Collections { corpus } => {
            let corpus = load_corpus(&corpus)?;
            let mut names: Vec<&String> = corpus.keys().collect();
            names.sort();
            for name in names {
                println!("{name}");
            }
        }
    }

    Ok(())
}
