//! OpenAI embeddings provider (`POST /embeddings`).

use crate::embeddings::provider::{check_count, EmbeddingProvider};
use crate::embeddings::providers::http_client;
use docent_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI embedding provider. One request per batch.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com/v1";

    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> AppResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Vectors in input order. The service labels each with its input index
    /// and does not promise to return them sorted.
    fn into_vectors(mut response: EmbeddingResponse, expected: usize) -> AppResult<Vec<Vec<f32>>> {
        check_count(expected, response.data.len())?;
        response.data.sort_by_key(|d| d.index);

        if response
            .data
            .iter()
            .enumerate()
            .any(|(position, d)| position != d.index)
        {
            return Err(AppError::EmbeddingService(
                "Embedding response indices do not cover the input".to_string(),
            ));
        }

        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> Option<usize> {
        match self.model.as_str() {
            "text-embedding-3-small" | "text-embedding-ada-002" => Some(1536),
            "text-embedding-3-large" => Some(3072),
            _ => None,
        }
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), provider = "openai", model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| {
                AppError::EmbeddingService(format!("Failed to send request to OpenAI: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::EmbeddingService(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::EmbeddingService(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let vectors = Self::into_vectors(body, texts.len())?;
        debug!("Received {} embeddings", vectors.len());
        Ok(vectors)
    }
}
