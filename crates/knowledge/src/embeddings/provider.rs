//! Embedding provider trait and factory.

use crate::embeddings::providers::{HashingProvider, OllamaProvider, OpenAiProvider};
use docent_core::config::EmbeddingSettings;
use docent_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Embedding service.
///
/// `embed_batch` returns exactly one vector per input, in input order.
/// Failures are reported as `AppError::EmbeddingService` and never retried.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Provider name (e.g., "openai", "ollama", "hashing")
    fn provider_name(&self) -> &str;

    /// Model identifier
    fn model_name(&self) -> &str;

    /// Vector size, when known without calling the service
    fn dimensions(&self) -> Option<usize>;

    /// Embed multiple texts in one call.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        if results.len() != 1 {
            return Err(AppError::EmbeddingService(format!(
                "Expected 1 embedding, got {}",
                results.len()
            )));
        }
        results
            .pop()
            .ok_or_else(|| AppError::EmbeddingService("No embedding returned".to_string()))
    }
}

/// Ensure a service answered with one vector per input.
pub(crate) fn check_count(expected: usize, got: usize) -> AppResult<()> {
    if expected != got {
        return Err(AppError::EmbeddingService(format!(
            "Embedding service returned {} vectors for {} inputs",
            got, expected
        )));
    }
    Ok(())
}

/// Create an embedding provider from the `embedding` configuration section.
pub fn create_provider(
    settings: &EmbeddingSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let timeout = Duration::from_secs(settings.timeout_secs);

    match settings.provider.as_str() {
        "hashing" => Ok(Arc::new(HashingProvider::new(settings.dimensions))),

        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config(format!(
                    "OpenAI embeddings require an API key (set {})",
                    settings.api_key_env.as_deref().unwrap_or("OPENAI_API_KEY")
                ))
            })?;
            let endpoint = settings
                .endpoint
                .as_deref()
                .unwrap_or(OpenAiProvider::DEFAULT_ENDPOINT);
            Ok(Arc::new(OpenAiProvider::new(
                endpoint,
                api_key,
                &settings.model,
                timeout,
            )?))
        }

        "ollama" => {
            let endpoint = settings
                .endpoint
                .as_deref()
                .unwrap_or(OllamaProvider::DEFAULT_ENDPOINT);
            Ok(Arc::new(OllamaProvider::new(endpoint, &settings.model, timeout)?))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: openai, ollama, hashing",
            settings.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str) -> EmbeddingSettings {
        EmbeddingSettings {
            provider: provider.to_string(),
            ..EmbeddingSettings::default()
        }
    }

    #[test]
    fn test_create_hashing_provider() {
        let mut settings = settings("hashing");
        settings.dimensions = 128;

        let provider = create_provider(&settings, None).unwrap();
        assert_eq!(provider.provider_name(), "hashing");
        assert_eq!(provider.dimensions(), Some(128));
    }

    #[test]
    fn test_create_openai_provider() {
        let provider = create_provider(&settings("openai"), Some("sk-test")).unwrap();
        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.model_name(), "text-embedding-3-small");
        assert_eq!(provider.dimensions(), Some(1536));
    }

    #[test]
    fn test_openai_requires_key() {
        assert!(matches!(
            create_provider(&settings("openai"), None),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider(&settings("unknown"), None);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider(&settings("hashing"), None).unwrap();
        let embedding = provider.embed("test text").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }

    #[test]
    fn test_check_count() {
        assert!(check_count(3, 3).is_ok());
        assert!(matches!(
            check_count(3, 2),
            Err(AppError::EmbeddingService(_))
        ));
    }
}
