//! RAG response types.

use crate::types::{ScoreKind, ScoredPassage};
use serde::{Deserialize, Serialize};

/// Passages retrieved for one question, plus the context built from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalContext {
    /// Passage contents in rank order, joined by the context separator
    pub text: String,

    /// Ranked passages the text was built from
    pub passages: Vec<ScoredPassage>,

    /// How to read the passage scores
    pub score_kind: ScoreKind,
}

/// A retrieved passage as reported to users: id, score, page and a snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagSourceRef {
    pub id: String,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    pub snippet: String,
}

/// Outcome of answering one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagResponse {
    pub question: String,

    /// Generated answer; `None` for a blank question
    pub answer: Option<String>,

    pub score_kind: Option<ScoreKind>,

    pub sources: Vec<RagSourceRef>,
}

/// Maximum snippet length for source references.
const MAX_SNIPPET_CHARS: usize = 150;

impl RagResponse {
    /// Response for a blank question: nothing retrieved, nothing generated.
    pub fn unanswered(question: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: None,
            score_kind: None,
            sources: Vec::new(),
        }
    }

    pub fn new(question: &str, answer: Option<String>, context: &RetrievalContext) -> Self {
        Self {
            question: question.to_string(),
            answer,
            score_kind: Some(context.score_kind),
            sources: context.passages.iter().map(RagSourceRef::from).collect(),
        }
    }
}

impl From<&ScoredPassage> for RagSourceRef {
    fn from(scored: &ScoredPassage) -> Self {
        let content = &scored.passage.content;
        let snippet = if content.chars().count() > MAX_SNIPPET_CHARS {
            let cut: String = content.chars().take(MAX_SNIPPET_CHARS).collect();
            format!("{}...", cut.trim_end())
        } else {
            content.clone()
        };

        Self {
            id: scored.id.clone(),
            score: scored.score,
            page: scored.passage.metadata.get("page").and_then(|v| v.as_u64()),
            snippet,
        }
    }
}
