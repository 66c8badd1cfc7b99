//! Deterministic stand-ins for the network-backed collaborators.

use crate::embedding::{ensure_embeddable, Embedder};
use crate::error::{Result, StoryQaError};
use crate::generation::GenerationBackend;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Bag-of-words embedder over a fixed vocabulary.
///
/// Text containing `POISON` fails to embed.
pub struct KeywordEmbedder {
    vocabulary: Vec<&'static str>,
    pub calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self {
            vocabulary: vec![
                "dragon", "pax", "wish", "wishes", "name", "teapot", "bridge", "boy", "gold",
                "smoke",
            ],
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ensure_embeddable(text)?;
        if text.contains("POISON") {
            return Err(StoryQaError::Embedding("poisoned chunk".to_string()));
        }

        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        // Trailing constant component keeps every vector non-zero
        let mut vector: Vec<f32> = self
            .vocabulary
            .iter()
            .map(|term| words.iter().filter(|w| *w == term).count() as f32)
            .collect();
        vector.push(0.1);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len() + 1
    }
}

/// Embedder that always returns a vector of a fixed length.
pub struct FixedEmbedder(pub usize);

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        ensure_embeddable(text)?;
        Ok(vec![1.0; self.0])
    }

    fn dimensions(&self) -> usize {
        self.0
    }
}

/// Scripted generation backend.
pub struct StubBackend {
    name: String,
    behavior: StubBehavior,
    pub calls: AtomicUsize,
}

#[derive(Clone)]
pub enum StubBehavior {
    /// Return the prompt unchanged.
    Echo,
    /// Always fail.
    Fail(String),
    /// Sleep longer than any probe timeout.
    Hang(Duration),
    /// Answer the liveness probe, fail every later call.
    FailAfterProbe,
}

impl StubBackend {
    pub fn new(name: &str, behavior: StubBehavior) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for StubBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            StubBehavior::Echo => Ok(prompt.to_string()),
            StubBehavior::Fail(reason) => Err(StoryQaError::Generation(reason.clone())),
            StubBehavior::Hang(duration) => {
                tokio::time::sleep(*duration).await;
                Ok("too late".to_string())
            }
            StubBehavior::FailAfterProbe if call == 0 => Ok("ok".to_string()),
            StubBehavior::FailAfterProbe => {
                Err(StoryQaError::Generation("connection reset".to_string()))
            }
        }
    }
}
