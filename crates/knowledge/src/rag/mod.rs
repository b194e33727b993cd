//! Question answering over the indexed document.
//!
//! `Rag::ask` runs the query pipeline as one straight sequence: guard,
//! embed, search, assemble context, generate.

pub mod answer;
pub mod retrieve;
pub mod types;

pub use answer::Generator;
pub use retrieve::{assemble_context, Retriever, CONTEXT_SEPARATOR};
pub use types::{RagResponse, RagSourceRef, RetrievalContext};

use docent_core::AppResult;

/// Retriever plus generator.
pub struct Rag {
    retriever: Retriever,
    generator: Generator,
}

impl Rag {
    pub fn new(retriever: Retriever, generator: Generator) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    /// Answer a question; `None` for a blank question.
    pub async fn ask(&self, question: &str) -> AppResult<Option<String>> {
        Ok(self.ask_detailed(question).await?.answer)
    }

    /// Answer a question and report the passages the answer was grounded on.
    pub async fn ask_detailed(&self, question: &str) -> AppResult<RagResponse> {
        if question.trim().is_empty() {
            tracing::debug!("Blank question, skipping retrieval");
            return Ok(RagResponse::unanswered(question));
        }

        tracing::info!("Answering question ({} chars)", question.len());

        let context = self.retriever.retrieve(question).await?;
        let answer = self.generator.answer(question, &context.text).await?;

        Ok(RagResponse::new(question, answer, &context))
    }
}
