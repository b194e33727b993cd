//! Fake embedding and generation services that count their calls.

use crate::embeddings::{EmbeddingProvider, HashingProvider};
use crate::types::{Passage, ScoreKind, ScoredPassage};
use crate::vector_index::VectorIndex;
use async_trait::async_trait;
use docent_core::{AppError, AppResult};
use docent_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use docent_prompt::REFUSAL_SENTENCE;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Hashing embeddings with a call counter, optionally failing every call.
#[derive(Debug)]
pub struct CountingEmbedder {
    inner: HashingProvider,
    calls: AtomicUsize,
    fail: bool,
}

impl CountingEmbedder {
    pub fn new() -> Self {
        Self::with_dimensions(384)
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            inner: HashingProvider::new(dimensions),
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    fn provider_name(&self) -> &str {
        "counting"
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> Option<usize> {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::EmbeddingService("429 Too Many Requests".to_string()));
        }
        self.inner.embed_batch(texts).await
    }
}

/// Index wrapper counting queries.
pub struct CountingIndex<I> {
    inner: I,
    queries: AtomicUsize,
}

impl<I: VectorIndex> CountingIndex<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<I: VectorIndex> VectorIndex for CountingIndex<I> {
    fn backend_name(&self) -> &str {
        self.inner.backend_name()
    }

    fn score_kind(&self) -> ScoreKind {
        self.inner.score_kind()
    }

    async fn upsert(
        &self,
        ids: &[String],
        passages: &[Passage],
        embeddings: &[Vec<f32>],
    ) -> AppResult<usize> {
        self.inner.upsert(ids, passages, embeddings).await
    }

    async fn query(&self, embedding: &[f32], k: usize) -> AppResult<Vec<ScoredPassage>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query(embedding, k).await
    }

    async fn count(&self) -> AppResult<usize> {
        self.inner.count().await
    }

    async fn reset(&self) -> AppResult<()> {
        self.inner.reset().await
    }
}

/// How the fake generation service replies.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// Quote the first statement mentioning "capital of", else refuse
    Grounded,
    /// Fail every call
    Unavailable,
}

/// Generation service that records every request it receives.
#[derive(Debug)]
pub struct RecordingClient {
    reply: Reply,
    requests: Mutex<Vec<LlmRequest>>,
}

impl RecordingClient {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for RecordingClient {
    fn provider_name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let content = match self.reply {
            Reply::Unavailable => {
                return Err(AppError::GenerationService(
                    "connection refused".to_string(),
                ))
            }
            Reply::Grounded => request
                .prompt
                .lines()
                .find(|line| line.contains("capital of") && !line.trim_end().ends_with('?'))
                .map(str::to_string)
                .unwrap_or_else(|| REFUSAL_SENTENCE.to_string()),
        };

        Ok(LlmResponse {
            content: format!("{}\n", content),
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}
