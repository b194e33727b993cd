//! Ranking correctness for both index backends.

use crate::lancedb_index::LanceDbIndex;
use crate::memory_index::MemoryIndex;
use crate::types::{Metadata, Passage, ScoredPassage};
use crate::vector_index::VectorIndex;
use tempfile::TempDir;

/// Helper to create a normalized embedding.
fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

/// Store `rows` in `index` and query it with `query`.
async fn rank(
    index: &dyn VectorIndex,
    rows: &[(&str, &str, Vec<f32>)],
    query: &[f32],
    k: usize,
) -> Vec<ScoredPassage> {
    let ids: Vec<String> = rows.iter().map(|(id, _, _)| id.to_string()).collect();
    let passages: Vec<Passage> = rows
        .iter()
        .map(|(_, text, _)| Passage::new(*text, Metadata::new()))
        .collect();
    let embeddings: Vec<Vec<f32>> = rows.iter().map(|(_, _, e)| e.clone()).collect();

    index.upsert(&ids, &passages, &embeddings).await.unwrap();
    index.query(&normalize(query), k).await.unwrap()
}

fn graded_rows() -> Vec<(&'static str, &'static str, Vec<f32>)> {
    vec![
        ("doc-0", "Text A", normalize(&[1.0, 0.0, 0.0])),
        ("doc-1", "Text B", normalize(&[0.7, 0.7, 0.0])),
        ("doc-2", "Text C", normalize(&[0.0, 1.0, 0.0])),
        ("doc-3", "Text D", normalize(&[-1.0, 0.0, 0.0])),
    ]
}

fn assert_ranked(index: &dyn VectorIndex, results: &[ScoredPassage]) {
    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["doc-0", "doc-1", "doc-2", "doc-3"]);

    for pair in results.windows(2) {
        assert!(
            !index.score_kind().is_better(pair[1].score, pair[0].score),
            "Scores should be ordered: {} then {}",
            pair[0].score,
            pair[1].score
        );
    }
}

#[tokio::test]
async fn test_memory_scores_are_ordered() {
    let index = MemoryIndex::new();
    let results = rank(&index, &graded_rows(), &[1.0, 0.0, 0.0], 10).await;

    assert_ranked(&index, &results);
    assert!(results[0].score > 0.99, "Perfect match should score near 1.0");
    assert!(results[3].score < -0.99, "Opposite vector should score near -1.0");
}

#[tokio::test]
async fn test_lancedb_scores_are_ordered() {
    let temp = TempDir::new().unwrap();
    let uri = temp.path().join("index").to_string_lossy().to_string();
    let index = LanceDbIndex::open(&uri, "documents", false).await.unwrap();
    let results = rank(&index, &graded_rows(), &[1.0, 0.0, 0.0], 10).await;

    assert_ranked(&index, &results);
    assert!(results[0].score < 0.01, "Perfect match should be at distance ~0");
    assert!(results[3].score > 1.99, "Opposite vector should be at distance ~2");
}

#[tokio::test]
async fn test_low_scoring_passages_are_kept() {
    let index = MemoryIndex::new();
    let rows = vec![
        ("doc-0", "Rust programming language features", normalize(&[1.0, 0.0, 0.0, 0.0])),
        ("doc-1", "Cooking recipes for pasta", normalize(&[-0.3, -0.8, 0.4, -0.2])),
    ];
    let results = rank(&index, &rows, &[0.0, 0.0, 0.0, 1.0], 5).await;

    // Nothing is filtered by score, however unrelated
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.score < 0.5));
}

#[tokio::test]
async fn test_top_k_limits_results() {
    let index = MemoryIndex::new();
    let results = rank(&index, &graded_rows(), &[1.0, 0.3, 0.0], 2).await;

    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["doc-0", "doc-1"]);
}
