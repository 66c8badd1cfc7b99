//! Answer generation backends and the fallback chain that selects one.

mod answer_model;
mod ollama;
mod openai;

pub use answer_model::{
    ActiveBackend, AnswerModel, BackendCandidate, ProbeConfig, ProbeOutcome, ProbeReport,
};
pub use ollama::OllamaBackend;
pub use openai::OpenAIBackend;

use crate::config::{BackendProvider, BackendSpec};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A text-generation capability: prompt in, text out.
///
/// Calls must be independent of each other; a backend holds no per-call state.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Generate a completion for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Construct the backend described by a spec.
///
/// Construction never contacts the service; availability is established by
/// the liveness probe in [`AnswerModel::initialize`].
pub fn build_backend(spec: &BackendSpec) -> Result<Arc<dyn GenerationBackend>> {
    let backend: Arc<dyn GenerationBackend> = match spec.provider {
        BackendProvider::Ollama => Arc::new(OllamaBackend::from_spec(spec)?),
        BackendProvider::OpenAI => Arc::new(OpenAIBackend::from_spec(spec)?),
    };
    Ok(backend)
}

/// Build a candidate for every spec, in order.
pub fn candidates_from_specs(specs: &[BackendSpec]) -> Result<Vec<BackendCandidate>> {
    specs
        .iter()
        .map(|spec| {
            Ok(BackendCandidate::new(build_backend(spec)?)
                .with_label(spec.label())
                .with_max_prompt_chars(spec.max_prompt_chars))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_keep_spec_order() {
        let specs = vec![
            BackendSpec::ollama("primary", "mistral"),
            BackendSpec::openai("fallback", "gpt-4o-mini"),
        ];
        let candidates = candidates_from_specs(&specs).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].label(), "ollama (mistral)");
        assert_eq!(candidates[1].label(), "openai (gpt-4o-mini)");
    }
}
