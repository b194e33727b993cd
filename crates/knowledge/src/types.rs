//! Domain types for the ingestion and query pipelines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Passage metadata: string keys to JSON scalars.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One page-level block of text produced by the document loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    pub text: String,
    pub metadata: Metadata,
}

impl PageText {
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

/// A chunk of document text and the metadata inherited from its page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub content: String,
    pub metadata: Metadata,
}

impl Passage {
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

/// A passage as stored in an index: id, passage and embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedPassage {
    pub id: String,
    pub passage: Passage,
    pub embedding: Vec<f32>,
}

/// How an index reports relevance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreKind {
    /// Lower is closer
    Distance,
    /// Higher is closer
    Similarity,
}

impl ScoreKind {
    /// Whether score `a` ranks ahead of score `b`.
    pub fn is_better(&self, a: f32, b: f32) -> bool {
        match self {
            ScoreKind::Distance => a < b,
            ScoreKind::Similarity => a > b,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreKind::Distance => "distance",
            ScoreKind::Similarity => "similarity",
        }
    }
}

/// A retrieved passage with the score the index assigned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub id: String,
    pub passage: Passage,
    pub score: f32,
}

/// Id for the passage at `ordinal` within one ingestion run.
pub fn passage_id(ordinal: usize) -> String {
    format!("doc-{}", ordinal)
}

/// Statistics from one ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    pub source: String,
    pub pages: usize,
    pub passages: usize,
    pub written: usize,
    pub reset: bool,
    pub duration_ms: u64,
    pub ingested_at: DateTime<Utc>,
}

/// Snapshot of an index for `docent stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub backend: String,
    pub location: String,
    pub collection: String,
    pub rows: usize,
    pub score_kind: ScoreKind,
    pub embedding_provider: String,
    pub embedding_model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passage_ids_are_zero_based() {
        assert_eq!(passage_id(0), "doc-0");
        assert_eq!(passage_id(41), "doc-41");
    }

    #[test]
    fn test_score_kind_ordering() {
        assert!(ScoreKind::Distance.is_better(0.1, 0.4));
        assert!(ScoreKind::Similarity.is_better(0.9, 0.4));
        assert!(!ScoreKind::Similarity.is_better(0.4, 0.4));
    }

    #[test]
    fn test_score_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ScoreKind::Distance).unwrap(),
            "\"distance\""
        );
    }
}
