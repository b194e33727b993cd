//! Embedding provider implementations.

pub mod hashing;
pub mod ollama;
pub mod openai;

pub use hashing::HashingProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use docent_core::{AppError, AppResult};
use std::time::Duration;

pub(crate) fn http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::EmbeddingService(format!("Failed to create HTTP client: {}", e)))
}
