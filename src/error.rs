//! Error types for StoryQA.

use thiserror::Error;

/// Library-level error type for StoryQA operations.
#[derive(Error, Debug)]
pub enum StoryQaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ingestion failed: {0}")]
    Ingestion(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Embedding dimension mismatch: index has {expected}, query has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("No generation backend available: {0}")]
    BackendUnavailable(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Prompt too large for backend: {length} characters (limit {limit})")]
    ContextTooLarge { length: usize, limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),
}

impl StoryQaError {
    /// Whether this error makes pipeline construction impossible.
    ///
    /// Embedding, backend and generation failures are recovered where they
    /// happen; configuration and ingestion failures are not.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StoryQaError::Config(_)
                | StoryQaError::Ingestion(_)
                | StoryQaError::Io(_)
                | StoryQaError::TomlParse(_)
        )
    }
}

/// Result type alias for StoryQA operations.
pub type Result<T> = std::result::Result<T, StoryQaError>;
