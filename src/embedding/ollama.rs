//! Ollama embeddings implementation.

use super::{ensure_embeddable, Embedder};
use crate::error::{Result, StoryQaError};
use crate::ollama::OllamaClient;
use async_trait::async_trait;
use tracing::instrument;

/// Embedder backed by a local Ollama server.
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create an embedder for `model` served at `base_url`.
    pub fn new(base_url: &str, model: &str, dimensions: usize) -> Result<Self> {
        Ok(Self {
            client: OllamaClient::new(base_url)?,
            model: model.to_string(),
            dimensions,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        ensure_embeddable(text)?;
        let embedding = self.client.embed(&self.model, text).await?;

        if embedding.len() != self.dimensions {
            return Err(StoryQaError::Embedding(format!(
                "Model '{}' returned {} dimensions, expected {}",
                self.model,
                embedding.len(),
                self.dimensions
            )));
        }
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_text_rejected_before_request() {
        // Port 9 (discard) is never an Ollama server; the request must not be made.
        let embedder = OllamaEmbedder::new("http://127.0.0.1:9", "all-minilm", 384).unwrap();
        let err = embedder.embed("   ").await.unwrap_err();
        assert!(err.to_string().contains("Cannot embed empty text"));
    }
}
