//! Configuration module for StoryQA.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QaPrompts};
pub use settings::{
    BackendProvider, BackendSpec, ChunkingSettings, DocumentSettings, EmbeddingProvider,
    EmbeddingSettings, GeneralSettings, GenerationSettings, PromptSettings, RetrievalSettings,
    Settings, DEFAULT_OLLAMA_URL,
};
