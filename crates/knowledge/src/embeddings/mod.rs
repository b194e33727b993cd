//! Embedding generation.
//!
//! Providers sit behind [`EmbeddingProvider`]; [`embed_in_batches`] drives
//! one provider over a long input in fixed-size, sequential batches.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{HashingProvider, OllamaProvider, OpenAiProvider};

use docent_core::{AppError, AppResult};

/// Embed `texts` in order, `batch_size` inputs per service call.
///
/// The result has exactly one vector per input; a short or long reply from
/// the service is an `EmbeddingService` error.
pub async fn embed_in_batches(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
    batch_size: usize,
) -> AppResult<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }
    if batch_size == 0 {
        return Err(AppError::Config(
            "Embedding batch size must be at least 1".to_string(),
        ));
    }

    tracing::info!(
        "Embedding {} texts with {} (model: {})",
        texts.len(),
        provider.provider_name(),
        provider.model_name()
    );

    let mut embeddings = Vec::with_capacity(texts.len());
    for (batch_idx, batch) in texts.chunks(batch_size).enumerate() {
        let vectors = provider.embed_batch(batch).await?;
        provider::check_count(batch.len(), vectors.len())?;
        tracing::debug!("Embedded batch {} ({} texts)", batch_idx, batch.len());
        embeddings.extend(vectors);
    }

    Ok(embeddings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingProvider {
        calls: AtomicUsize,
        drop_last: bool,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingProvider {
        fn provider_name(&self) -> &str {
            "counting"
        }

        fn model_name(&self) -> &str {
            "counting"
        }

        fn dimensions(&self) -> Option<usize> {
            Some(1)
        }

        async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut out: Vec<Vec<f32>> = texts.iter().map(|t| vec![t.len() as f32]).collect();
            if self.drop_last {
                out.pop();
            }
            Ok(out)
        }
    }

    #[tokio::test]
    async fn test_batches_preserve_order() {
        let provider = CountingProvider::default();
        let texts: Vec<String> = (1..=5).map(|n| "x".repeat(n)).collect();

        let vectors = embed_in_batches(&provider, &texts, 2).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        let lengths: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
        assert_eq!(lengths, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[tokio::test]
    async fn test_short_reply_is_service_error() {
        let provider = CountingProvider {
            drop_last: true,
            ..CountingProvider::default()
        };
        let texts = vec!["a".to_string(), "b".to_string()];

        assert!(matches!(
            embed_in_batches(&provider, &texts, 10).await,
            Err(AppError::EmbeddingService(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let provider = CountingProvider::default();
        let vectors = embed_in_batches(&provider, &[], 10).await.unwrap();
        assert!(vectors.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
