//! Ollama generation backend.

use super::GenerationBackend;
use crate::config::BackendSpec;
use crate::error::Result;
use crate::ollama::{GenerateParams, OllamaClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Backend that generates with a model served by Ollama.
pub struct OllamaBackend {
    name: String,
    client: OllamaClient,
    model: String,
    params: GenerateParams,
}

impl OllamaBackend {
    /// Create a backend from its spec.
    pub fn from_spec(spec: &BackendSpec) -> Result<Self> {
        Ok(Self {
            name: spec.name.clone(),
            client: OllamaClient::new(&spec.base_url)?,
            model: spec.model.clone(),
            params: GenerateParams {
                temperature: spec.temperature,
                max_tokens: spec.max_tokens,
            },
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Prompt length: {} characters", prompt.chars().count());
        let text = self.client.generate(&self.model, prompt, self.params).await?;
        Ok(text.trim().to_string())
    }
}
