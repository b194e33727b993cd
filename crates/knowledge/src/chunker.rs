//! Splitting pages into overlapping passages.
//!
//! Splitting is recursive over semantic levels (blank-line runs, line
//! breaks, sentences, words, graphemes) via `text-splitter`: a smaller unit
//! is only used where a larger one cannot fit the target size.

use crate::types::{PageText, Passage};
use docent_core::config::ChunkingSettings;
use docent_core::{AppError, AppResult};
use text_splitter::{Characters, ChunkConfig, TextSplitter};

/// Page-at-a-time passage splitter.
pub struct Chunker {
    splitter: TextSplitter<Characters>,
    size: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a chunker with a target `size` and `overlap`, both in characters.
    pub fn new(size: usize, overlap: usize) -> AppResult<Self> {
        if size == 0 || overlap >= size {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, size
            )));
        }

        let config = ChunkConfig::new(size)
            .with_overlap(overlap)
            .map_err(|e| AppError::Config(format!("Invalid chunk configuration: {}", e)))?;

        Ok(Self {
            splitter: TextSplitter::new(config),
            size,
            overlap,
        })
    }

    pub fn from_settings(settings: &ChunkingSettings) -> AppResult<Self> {
        Self::new(settings.size, settings.overlap)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split pages into passages.
    ///
    /// Pages are split independently, so no passage spans two pages, and each
    /// passage carries a copy of its page's metadata.
    ///
    /// # Errors
    /// `AppError::EmptyDocument` when no page yields any text.
    pub fn split(&self, pages: &[PageText]) -> AppResult<Vec<Passage>> {
        let passages: Vec<Passage> = pages
            .iter()
            .flat_map(|page| {
                self.splitter
                    .chunks(&page.text)
                    .filter(|chunk| !chunk.trim().is_empty())
                    .map(move |chunk| Passage::new(chunk, page.metadata.clone()))
            })
            .collect();

        if passages.is_empty() {
            return Err(AppError::EmptyDocument(format!(
                "{} pages produced no passages",
                pages.len()
            )));
        }

        tracing::debug!(
            "Split {} pages into {} passages (size {}, overlap {})",
            pages.len(),
            passages.len(),
            self.size,
            self.overlap
        );

        Ok(passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metadata;
    use serde_json::Value;

    fn page(text: &str, number: usize) -> PageText {
        let mut metadata = Metadata::new();
        metadata.insert("page".to_string(), Value::from(number));
        PageText::new(text, metadata)
    }

    /// Space-separated unique tokens, so positions can be recovered from content.
    fn numbered_words(count: usize) -> String {
        (0..count)
            .map(|i| format!("w{:04}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        assert!(matches!(Chunker::new(100, 100), Err(AppError::Config(_))));
        assert!(matches!(Chunker::new(100, 150), Err(AppError::Config(_))));
        assert!(Chunker::new(1000, 150).is_ok());
    }

    #[test]
    fn test_passages_never_exceed_size() {
        let chunker = Chunker::new(1000, 150).unwrap();
        let text = format!(
            "{}\n\n{}\n{}",
            numbered_words(400),
            "Uma frase curta. ".repeat(120),
            "ação ".repeat(300)
        );

        let passages = chunker.split(&[page(&text, 0)]).unwrap();
        assert!(passages.len() > 1);
        for passage in &passages {
            assert!(passage.content.chars().count() <= 1000);
        }
    }

    #[test]
    fn test_adjacent_passages_overlap() {
        let chunker = Chunker::new(200, 50).unwrap();
        let passages = chunker.split(&[page(&numbered_words(200), 0)]).unwrap();
        assert!(passages.len() > 2);

        for pair in passages.windows(2) {
            let first_token = pair[1].content.split_whitespace().next().unwrap();
            assert!(
                pair[0].content.contains(first_token),
                "{:?} should start inside {:?}",
                pair[1].content,
                pair[0].content
            );
        }
    }

    /// Length of the longest suffix of `prev` that is also a prefix of `next`.
    fn shared_span(prev: &str, next: &str) -> usize {
        (1..=prev.len().min(next.len()))
            .rev()
            .find(|&k| prev.ends_with(&next[..k]))
            .unwrap_or(0)
    }

    #[test]
    fn test_default_overlap_is_bounded() {
        let chunker = Chunker::new(1000, 150).unwrap();
        let passages = chunker.split(&[page(&numbered_words(800), 0)]).unwrap();
        assert!(passages.len() > 2);

        for pair in passages.windows(2) {
            let shared = shared_span(&pair[0].content, &pair[1].content);
            assert!(
                shared > 0 && shared <= 150,
                "shared span {} between {:?} and {:?}",
                shared,
                pair[0].content,
                pair[1].content
            );
        }
    }

    #[test]
    fn test_passages_do_not_span_pages() {
        let chunker = Chunker::new(1000, 150).unwrap();
        let passages = chunker
            .split(&[page("alpha page text", 0), page("beta page text", 1)])
            .unwrap();

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].content, "alpha page text");
        assert_eq!(passages[0].metadata["page"], 0);
        assert_eq!(passages[1].metadata["page"], 1);
    }

    #[test]
    fn test_blank_pages_are_skipped() {
        let chunker = Chunker::new(1000, 150).unwrap();
        let passages = chunker
            .split(&[page("   \n", 0), page("content", 1)])
            .unwrap();
        assert_eq!(passages.len(), 1);
    }

    #[test]
    fn test_empty_document() {
        let chunker = Chunker::new(1000, 150).unwrap();
        assert!(matches!(chunker.split(&[]), Err(AppError::EmptyDocument(_))));
        assert!(matches!(
            chunker.split(&[page("", 0), page("\n\n", 1)]),
            Err(AppError::EmptyDocument(_))
        ));
    }
}
