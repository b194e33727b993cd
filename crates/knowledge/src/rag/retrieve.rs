//! Retrieval and context assembly.

use crate::embeddings::EmbeddingProvider;
use crate::rag::types::RetrievalContext;
use crate::types::ScoredPassage;
use crate::vector_index::VectorIndex;
use docent_core::AppResult;
use std::sync::Arc;

/// Separator placed between passages in the assembled context.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Join passage contents in rank order.
pub fn assemble_context(passages: &[ScoredPassage]) -> String {
    passages
        .iter()
        .map(|p| p.passage.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Embeds a question and fetches the nearest passages.
///
/// Every hit up to `top_k` is kept whatever its score; scores are logged,
/// never used to filter or reweight.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            top_k,
        }
    }

    /// Ranked passages for `question`, best first.
    pub async fn search(&self, question: &str) -> AppResult<Vec<ScoredPassage>> {
        let query_embedding = self.embedder.embed(question).await?;
        let results = self.index.query(&query_embedding, self.top_k).await?;

        tracing::info!(
            "Retrieved {} passages (top-{}, {} scores)",
            results.len(),
            self.top_k,
            self.index.score_kind().as_str()
        );
        for result in &results {
            tracing::debug!("{} score {:.4}", result.id, result.score);
        }

        Ok(results)
    }

    /// Ranked passages and the context assembled from them.
    ///
    /// No hits gives an empty context, not an error.
    pub async fn retrieve(&self, question: &str) -> AppResult<RetrievalContext> {
        let passages = self.search(question).await?;
        Ok(RetrievalContext {
            text: assemble_context(&passages),
            passages,
            score_kind: self.index.score_kind(),
        })
    }
}
