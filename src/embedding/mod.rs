//! Embedding generation for semantic retrieval.

mod ollama;
mod openai;

pub use ollama::OllamaEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::{EmbeddingProvider, EmbeddingSettings};
use crate::error::{Result, StoryQaError};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
///
/// Implementations must be deterministic: the same text yields the same
/// vector, and every vector from one instance has the same length.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Reject text an embedding model cannot meaningfully process.
pub(crate) fn ensure_embeddable(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(StoryQaError::Embedding(
            "Cannot embed empty text".to_string(),
        ));
    }
    Ok(())
}

/// Create the embedder named in the settings.
pub fn create_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    let dimensions = settings.dimensions as usize;
    let embedder: Arc<dyn Embedder> = match settings.provider {
        EmbeddingProvider::Ollama => Arc::new(OllamaEmbedder::new(
            &settings.base_url,
            &settings.model,
            dimensions,
        )?),
        EmbeddingProvider::OpenAI => {
            Arc::new(OpenAIEmbedder::with_config(&settings.model, dimensions)?)
        }
    };
    Ok(embedder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_not_embeddable() {
        assert!(ensure_embeddable("").is_err());
        assert!(ensure_embeddable(" \n\t").is_err());
        assert!(ensure_embeddable("dragon").is_ok());
    }

    #[test]
    fn test_create_embedder_uses_configured_dimensions() {
        let settings = EmbeddingSettings::default();
        let embedder = create_embedder(&settings).unwrap();
        assert_eq!(embedder.dimensions(), 384);
    }
}
