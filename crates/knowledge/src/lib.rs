//! Document-grounded question answering.
//!
//! Ingestion turns one document into embedded passages in a vector index;
//! the query side retrieves the nearest passages for a question and asks a
//! language model to answer from them alone.

pub mod chunker;
pub mod embeddings;
pub mod ingest;
pub mod lancedb_index;
pub mod loader;
pub mod memory_index;
pub mod rag;
pub mod sanitize;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunker::Chunker;
pub use embeddings::{create_provider, embed_in_batches, EmbeddingProvider, HashingProvider};
pub use ingest::Ingestor;
pub use lancedb_index::LanceDbIndex;
pub use loader::load_document;
pub use memory_index::MemoryIndex;
pub use rag::{assemble_context, Generator, Rag, RagResponse, Retriever};
pub use sanitize::sanitize;
pub use types::{IndexStats, IngestStats, Metadata, PageText, Passage, ScoreKind, ScoredPassage};
pub use vector_index::VectorIndex;

use docent_core::{AppConfig, AppResult};
use std::path::Path;
use std::sync::Arc;

/// Embedding provider described by the configuration.
pub fn embedder_from_config(config: &AppConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let api_key = config.embedding.api_key();
    create_provider(&config.embedding, api_key.as_deref())
}

/// Open the configured LanceDB index.
pub async fn open_index(config: &AppConfig) -> AppResult<LanceDbIndex> {
    LanceDbIndex::open(
        &config.index_uri(),
        &config.index.collection,
        config.index.json_metadata,
    )
    .await
}

/// Ingest the document at `path` into the configured index.
pub async fn ingest(config: &AppConfig, path: &Path, reset: bool) -> AppResult<IngestStats> {
    config.ensure_docent_dir()?;

    let chunker = Chunker::from_settings(&config.chunking)?;
    let embedder = embedder_from_config(config)?;
    let index: Arc<dyn VectorIndex> = Arc::new(open_index(config).await?);

    Ingestor::new(chunker, embedder, index, config.embedding.batch_size)
        .with_reset(reset)
        .ingest(path)
        .await
}

/// Build the query pipeline for the configured services, index and prompt.
pub async fn build_rag(config: &AppConfig) -> AppResult<Rag> {
    let embedder = embedder_from_config(config)?;
    let index: Arc<dyn VectorIndex> = Arc::new(open_index(config).await?);

    let prompt = docent_prompt::resolve_prompt(&config.workspace, config.prompt_id.as_deref())?;
    let chat_key = config.generation.api_key();
    let client = docent_llm::create_client(&config.generation, chat_key.as_deref())?;

    tracing::debug!(
        "Query pipeline: {} embeddings, {} generation, prompt {}",
        embedder.provider_name(),
        client.provider_name(),
        prompt.id
    );

    let retriever = Retriever::new(embedder, index, config.retrieval.top_k);
    let generator = Generator::from_settings(client, prompt, &config.generation);
    Ok(Rag::new(retriever, generator))
}

/// Row count and settings of the configured index.
pub async fn index_stats(config: &AppConfig) -> AppResult<IndexStats> {
    let index = open_index(config).await?;
    let rows = index.count().await?;

    Ok(IndexStats {
        backend: index.backend_name().to_string(),
        location: index.uri().to_string(),
        collection: index.collection().to_string(),
        rows,
        score_kind: index.score_kind(),
        embedding_provider: config.embedding.provider.clone(),
        embedding_model: config.embedding.model.clone(),
    })
}

/// Remove every passage from the configured index.
pub async fn reset_index(config: &AppConfig) -> AppResult<usize> {
    let index = open_index(config).await?;
    let removed = index.count().await?;
    index.reset().await?;
    tracing::info!("Removed {} passages from {}", removed, index.uri());
    Ok(removed)
}
