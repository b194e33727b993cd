//! In-process vector index.

use crate::types::{IndexedPassage, Passage, ScoreKind, ScoredPassage};
use crate::vector_index::{check_lengths, cosine_similarity, VectorIndex};
use docent_core::{AppError, AppResult};
use std::sync::RwLock;

/// Brute-force cosine index held in memory. Scores are similarities.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    rows: RwLock<Vec<IndexedPassage>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored row, in insertion order.
    pub fn rows(&self) -> AppResult<Vec<IndexedPassage>> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> AppResult<std::sync::RwLockReadGuard<'_, Vec<IndexedPassage>>> {
        self.rows
            .read()
            .map_err(|_| AppError::IndexUnavailable("memory index lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<std::sync::RwLockWriteGuard<'_, Vec<IndexedPassage>>> {
        self.rows
            .write()
            .map_err(|_| AppError::IndexUnavailable("memory index lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl VectorIndex for MemoryIndex {
    fn backend_name(&self) -> &str {
        "memory"
    }

    fn score_kind(&self) -> ScoreKind {
        ScoreKind::Similarity
    }

    async fn upsert(
        &self,
        ids: &[String],
        passages: &[Passage],
        embeddings: &[Vec<f32>],
    ) -> AppResult<usize> {
        check_lengths(ids, passages, embeddings)?;

        let mut rows = self.write()?;
        rows.extend(
            ids.iter()
                .zip(passages)
                .zip(embeddings)
                .map(|((id, passage), embedding)| IndexedPassage {
                    id: id.clone(),
                    passage: passage.clone(),
                    embedding: embedding.clone(),
                }),
        );

        Ok(ids.len())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> AppResult<Vec<ScoredPassage>> {
        let rows = self.read()?;

        let mut scored: Vec<ScoredPassage> = rows
            .iter()
            .map(|row| ScoredPassage {
                id: row.id.clone(),
                passage: row.passage.clone(),
                score: cosine_similarity(embedding, &row.embedding),
            })
            .collect();

        // Stable sort: ties keep insertion order
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored)
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.read()?.len())
    }

    async fn reset(&self) -> AppResult<()> {
        self.write()?.clear();
        Ok(())
    }
}
