//! Deterministic, offline embedding provider.

use crate::embeddings::provider::EmbeddingProvider;
use docent_core::AppResult;
use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

const STOP_WORDS: [&str; 33] = [
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what",
];

/// Hashing provider for tests and offline use.
///
/// Vectors are built from word and character-trigram hashes, so texts
/// sharing vocabulary land close together. Not semantic, but stable across
/// runs and machines. Output is unit length; empty text maps to the zero
/// vector.
#[derive(Debug)]
pub struct HashingProvider {
    dimensions: usize,
    stop_words: HashSet<&'static str>,
}

impl HashingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            stop_words: STOP_WORDS.into_iter().collect(),
        }
    }

    fn hash(bytes: &[u8], multiplier: u64) -> u64 {
        bytes
            .iter()
            .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(*b as u64))
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];

        let lower = text.to_lowercase();
        let mut word_freq: HashMap<&str, usize> = HashMap::new();
        for word in lower.unicode_words() {
            if word.chars().count() > 2 && !self.stop_words.contains(word) {
                *word_freq.entry(word).or_insert(0) += 1;
            }
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let dim = (Self::hash(trigram.as_bytes(), 37) as usize) % self.dimensions;
                embedding[dim] += (*freq as f32).sqrt();
            }

            let dim = (Self::hash(word.as_bytes(), 31) as usize) % self.dimensions;
            embedding[dim] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashingProvider {
    fn provider_name(&self) -> &str {
        "hashing"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dimensions)
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_unit_length() {
        let provider = HashingProvider::new(384);
        let embedding = provider.embed("hello world").await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let provider = HashingProvider::new(384);
        let first = provider.embed("deterministic test").await.unwrap();
        let second = provider.embed("deterministic test").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_shared_vocabulary_scores_higher() {
        let provider = HashingProvider::new(384);
        let query = provider.embed("What is the capital of Freedonia?").await.unwrap();
        let related = provider
            .embed("The capital of Freedonia is Freedonia City.")
            .await
            .unwrap();
        let unrelated = provider
            .embed("Bananas ripen faster next to apples.")
            .await
            .unwrap();

        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = HashingProvider::new(64);
        let embedding = provider.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_utf8_text() {
        let provider = HashingProvider::new(384);
        let embedding = provider
            .embed("Não tenho informações necessárias 🎮 ação")
            .await
            .unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
