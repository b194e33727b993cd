//! Error types for the Docent pipeline.
//!
//! One enum covers every failure the ingestion and query pipelines can
//! surface. External-service failures (embedding, generation, vector store)
//! are carried unchanged up to the caller; nothing here is retried.

use thiserror::Error;

/// Unified error type for Docent.
///
/// All library functions return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Ingestion produced zero passages (empty or unparseable source)
    #[error("Empty document: {0}")]
    EmptyDocument(String),

    /// ids, passages and embeddings handed to the write path disagree in length
    #[error(
        "Dimension mismatch: {ids} ids, {passages} passages, {embeddings} embeddings"
    )]
    DimensionMismatch {
        ids: usize,
        passages: usize,
        embeddings: usize,
    },

    /// Embedding service failure (network, auth, rate limit, invalid input)
    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    /// Generation service failure
    #[error("Generation service error: {0}")]
    GenerationService(String),

    /// Vector store could not be reached or failed an operation
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source document could not be read or decoded
    #[error("Document error: {0}")]
    Document(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether the error came from an external dependency rather than
    /// from caller input or an internal invariant.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            AppError::EmbeddingService(_)
                | AppError::GenerationService(_)
                | AppError::IndexUnavailable(_)
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_message() {
        let err = AppError::DimensionMismatch {
            ids: 3,
            passages: 3,
            embeddings: 2,
        };
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: 3 ids, 3 passages, 2 embeddings"
        );
    }

    #[test]
    fn test_external_classification() {
        assert!(AppError::EmbeddingService("429".to_string()).is_external());
        assert!(AppError::GenerationService("timeout".to_string()).is_external());
        assert!(AppError::IndexUnavailable("refused".to_string()).is_external());
        assert!(!AppError::EmptyDocument("x".to_string()).is_external());
        assert!(!AppError::Config("x".to_string()).is_external());
    }

    #[test]
    fn test_from_serde_json() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
