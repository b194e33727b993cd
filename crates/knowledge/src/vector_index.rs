//! Vector index abstraction.
//!
//! Indexes declare their score convention through [`ScoreKind`]; callers
//! rank by result order and never interpret raw scores themselves.

use crate::types::{Passage, ScoreKind, ScoredPassage};
use docent_core::{AppError, AppResult};

/// Trait for vector index backends.
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Backend name (e.g., "lancedb", "memory")
    fn backend_name(&self) -> &str;

    /// How `query` scores should be read.
    fn score_kind(&self) -> ScoreKind;

    /// Write passages with their ids and embeddings; returns rows written.
    ///
    /// The three slices must have equal length. Existing ids are not
    /// checked: writing the same id twice stores two rows.
    async fn upsert(
        &self,
        ids: &[String],
        passages: &[Passage],
        embeddings: &[Vec<f32>],
    ) -> AppResult<usize>;

    /// Up to `k` passages nearest to `embedding`, best first.
    async fn query(&self, embedding: &[f32], k: usize) -> AppResult<Vec<ScoredPassage>>;

    /// Number of stored rows.
    async fn count(&self) -> AppResult<usize>;

    /// Remove every stored row.
    async fn reset(&self) -> AppResult<()>;
}

/// Reject write batches whose parts disagree in length.
pub fn check_lengths(ids: &[String], passages: &[Passage], embeddings: &[Vec<f32>]) -> AppResult<()> {
    if ids.len() != passages.len() || passages.len() != embeddings.len() {
        return Err(AppError::DimensionMismatch {
            ids: ids.len(),
            passages: passages.len(),
            embeddings: embeddings.len(),
        });
    }
    Ok(())
}

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metadata;

    #[test]
    fn test_dimension_mismatch() {
        let ids: Vec<String> = (0..3).map(crate::types::passage_id).collect();
        let passages: Vec<Passage> = (0..3)
            .map(|i| Passage::new(format!("p{}", i), Metadata::new()))
            .collect();
        let embeddings = vec![vec![0.0; 4]; 2];

        match check_lengths(&ids, &passages, &embeddings) {
            Err(AppError::DimensionMismatch {
                ids,
                passages,
                embeddings,
            }) => assert_eq!((ids, passages, embeddings), (3, 3, 2)),
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
