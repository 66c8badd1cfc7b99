//! Configuration settings for StoryQA.

use crate::error::{Result, StoryQaError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default Ollama endpoint used by local embedders and backends.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub document: DocumentSettings,
    pub chunking: ChunkingSettings,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
    pub generation: GenerationSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Source document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Document used when no path is given on the command line.
    pub default_path: String,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            default_path: "wish_dragon.pdf".to_string(),
        }
    }
}

/// Text chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

/// Embedding provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local Ollama server (default).
    #[default]
    Ollama,
    /// OpenAI embeddings API.
    OpenAI,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" | "local" => Ok(EmbeddingProvider::Ollama),
            "openai" => Ok(EmbeddingProvider::OpenAI),
            _ => Err(format!("Unknown embedding provider: {}", s)),
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::Ollama => write!(f, "ollama"),
            EmbeddingProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (ollama, openai).
    pub provider: EmbeddingProvider,
    /// Embedding model to use.
    pub model: String,
    /// Base URL for the Ollama provider.
    pub base_url: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Ollama,
            model: "all-minilm".to_string(),
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            dimensions: 384,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of chunks handed to the prompt.
    pub k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { k: 3 }
    }
}

/// Generation backend provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    /// Local Ollama server (default).
    #[default]
    Ollama,
    /// OpenAI chat completions.
    OpenAI,
}

impl std::str::FromStr for BackendProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" | "local" => Ok(BackendProvider::Ollama),
            "openai" => Ok(BackendProvider::OpenAI),
            _ => Err(format!("Unknown backend provider: {}", s)),
        }
    }
}

impl std::fmt::Display for BackendProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendProvider::Ollama => write!(f, "ollama"),
            BackendProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// One candidate in the generation fallback chain.
///
/// Model parameters are opaque to the pipeline; they are handed to the
/// backend when it is constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendSpec {
    /// Display name used in logs and diagnostics.
    pub name: String,
    /// Backend provider.
    #[serde(default)]
    pub provider: BackendProvider,
    /// Model identifier understood by the provider.
    pub model: String,
    /// Base URL (Ollama only).
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Longest prompt the backend accepts, in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_prompt_chars: Option<usize>,
}

fn default_ollama_url() -> String {
    DEFAULT_OLLAMA_URL.to_string()
}

fn default_temperature() -> f32 {
    0.3
}

impl BackendSpec {
    /// Create an Ollama backend spec with default parameters.
    pub fn ollama(name: &str, model: &str) -> Self {
        Self {
            name: name.to_string(),
            provider: BackendProvider::Ollama,
            model: model.to_string(),
            base_url: default_ollama_url(),
            temperature: default_temperature(),
            max_tokens: None,
            max_prompt_chars: None,
        }
    }

    /// Create an OpenAI backend spec with default parameters.
    pub fn openai(name: &str, model: &str) -> Self {
        Self {
            provider: BackendProvider::OpenAI,
            ..Self::ollama(name, model)
        }
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Short label for display, e.g. "ollama (mistral)".
    pub fn label(&self) -> String {
        format!("{} ({})", self.provider, self.model)
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Timeout for the startup liveness probe of each backend.
    pub probe_timeout_secs: u64,
    /// Prompt sent during the liveness probe.
    pub probe_prompt: String,
    /// Ordered candidates; the first that answers the probe is used.
    pub backends: Vec<BackendSpec>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            probe_timeout_secs: 30,
            probe_prompt: "test".to_string(),
            backends: vec![
                BackendSpec::ollama("primary", "mistral"),
                BackendSpec::ollama("fallback", "zephyr").with_max_tokens(128),
            ],
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Check values that would otherwise fail deep inside the pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size <= self.chunking.overlap {
            return Err(StoryQaError::Config(format!(
                "chunk_size ({}) must be greater than overlap ({})",
                self.chunking.chunk_size, self.chunking.overlap
            )));
        }
        if self.retrieval.k == 0 {
            return Err(StoryQaError::Config(
                "retrieval.k must be at least 1".to_string(),
            ));
        }
        if self.embedding.model.trim().is_empty() {
            return Err(StoryQaError::Config(
                "embedding.model must not be empty".to_string(),
            ));
        }
        if self.generation.probe_timeout_secs == 0 {
            return Err(StoryQaError::Config(
                "generation.probe_timeout_secs must be at least 1".to_string(),
            ));
        }
        if let Some(spec) = self.generation.backends.iter().find(|b| b.model.trim().is_empty()) {
            return Err(StoryQaError::Config(format!(
                "backend '{}' has an empty model name",
                spec.name
            )));
        }
        Ok(())
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| StoryQaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("storyqa")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Resolve the document to load, preferring an explicit argument.
    pub fn document_path(&self, explicit: Option<&str>) -> PathBuf {
        Self::expand_path(explicit.unwrap_or(&self.document.default_path))
    }
}
