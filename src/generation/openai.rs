//! OpenAI chat-completion backend.

use super::GenerationBackend;
use crate::config::BackendSpec;
use crate::error::{Result, StoryQaError};
use crate::openai::create_client;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_trait::async_trait;
use tracing::instrument;

/// Backend that generates with an OpenAI chat model.
pub struct OpenAIBackend {
    name: String,
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAIBackend {
    /// Create a backend from its spec.
    pub fn from_spec(spec: &BackendSpec) -> Result<Self> {
        Ok(Self {
            name: spec.name.clone(),
            client: create_client()?,
            model: spec.model.clone(),
            temperature: spec.temperature,
            max_tokens: spec.max_tokens,
        })
    }
}

#[async_trait]
impl GenerationBackend for OpenAIBackend {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| StoryQaError::Generation(e.to_string()))?;

        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(&self.model)
            .messages(vec![message.into()])
            .temperature(self.temperature);
        if let Some(max_tokens) = self.max_tokens {
            request.max_completion_tokens(max_tokens);
        }
        let request = request
            .build()
            .map_err(|e| StoryQaError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| StoryQaError::OpenAI(format!("Failed to generate response: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|content| content.trim().to_string())
            .ok_or_else(|| StoryQaError::Generation("Empty response from LLM".to_string()))
    }
}
