//! Pre-flight checks before building the pipeline.
//!
//! Validates inputs that would otherwise fail midway through indexing.

use crate::config::{BackendProvider, EmbeddingProvider, Settings};
use crate::document::ensure_exists;
use crate::error::{Result, StoryQaError};
use std::path::Path;

/// Run pre-flight checks for loading `document` with `settings`.
///
/// Only the embedding provider is required up front: generation backends
/// are allowed to be missing, the pipeline then runs degraded.
pub fn check(settings: &Settings, document: &Path) -> Result<()> {
    ensure_exists(document)?;
    if settings.embedding.provider == EmbeddingProvider::OpenAI {
        check_api_key()?;
    }
    Ok(())
}

/// Whether any configured backend talks to OpenAI.
pub fn uses_openai(settings: &Settings) -> bool {
    settings.embedding.provider == EmbeddingProvider::OpenAI
        || settings
            .generation
            .backends
            .iter()
            .any(|b| b.provider == BackendProvider::OpenAI)
}

/// Check if OpenAI API key is configured.
pub fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(StoryQaError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(StoryQaError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendSpec;

    #[test]
    fn test_missing_document_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = check(&Settings::default(), &dir.path().join("nope.pdf")).unwrap_err();
        assert!(matches!(err, StoryQaError::Ingestion(_)));
    }

    #[test]
    fn test_existing_document_passes_with_local_embedder() {
        let dir = tempfile::NamedTempFile::new().unwrap();
        assert!(check(&Settings::default(), dir.path()).is_ok());
    }

    #[test]
    fn test_uses_openai() {
        let mut settings = Settings::default();
        assert!(!uses_openai(&settings));
        settings
            .generation
            .backends
            .push(BackendSpec::openai("cloud", "gpt-4o-mini"));
        assert!(uses_openai(&settings));
    }
}
