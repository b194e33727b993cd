//! Ingestion pipeline: load, split, sanitize, embed, write.

use crate::chunker::Chunker;
use crate::embeddings::{embed_in_batches, EmbeddingProvider};
use crate::loader::load_document;
use crate::sanitize::sanitize;
use crate::types::{passage_id, IngestStats, PageText};
use crate::vector_index::VectorIndex;
use chrono::Utc;
use docent_core::AppResult;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Runs one document through the ingestion pipeline into an index.
pub struct Ingestor {
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    batch_size: usize,
    reset: bool,
}

impl Ingestor {
    pub fn new(
        chunker: Chunker,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        batch_size: usize,
    ) -> Self {
        Self {
            chunker,
            embedder,
            index,
            batch_size,
            reset: false,
        }
    }

    /// Clear the index before writing.
    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    /// Ingest the document at `path`.
    ///
    /// Without reset, passages are appended: ingesting the same file twice
    /// stores each passage twice.
    pub async fn ingest(&self, path: &Path) -> AppResult<IngestStats> {
        tracing::info!("Ingesting {}", path.display());
        let pages = load_document(path)?;
        self.ingest_pages(&path.display().to_string(), &pages).await
    }

    /// Ingest already-loaded pages.
    pub async fn ingest_pages(&self, source: &str, pages: &[PageText]) -> AppResult<IngestStats> {
        let start = Instant::now();

        let passages = sanitize(self.chunker.split(pages)?);
        tracing::info!(
            "Split {} pages into {} passages (size {}, overlap {})",
            pages.len(),
            passages.len(),
            self.chunker.size(),
            self.chunker.overlap()
        );

        let ids: Vec<String> = (0..passages.len()).map(passage_id).collect();
        let texts: Vec<String> = passages.iter().map(|p| p.content.clone()).collect();

        // A failed embedding run leaves the index untouched.
        let embeddings = embed_in_batches(self.embedder.as_ref(), &texts, self.batch_size).await?;

        if self.reset {
            tracing::info!("Resetting {} index", self.index.backend_name());
            self.index.reset().await?;
        }

        let written = self.index.upsert(&ids, &passages, &embeddings).await?;
        let duration = start.elapsed();

        tracing::info!(
            "Ingestion completed: {} passages written in {:.2}s",
            written,
            duration.as_secs_f64()
        );

        Ok(IngestStats {
            source: source.to_string(),
            pages: pages.len(),
            passages: passages.len(),
            written,
            reset: self.reset,
            duration_ms: duration.as_millis() as u64,
            ingested_at: Utc::now(),
        })
    }
}
