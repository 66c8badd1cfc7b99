//! Question-answering pipeline.
//!
//! State machine:
//!
//! ```text
//! Uninitialized -> Loading -> Ready     (index built, a backend answered its probe)
//!                          -> Degraded  (index built, no backend available)
//!                          -> Failed    (loading, chunking or indexing failed)
//! ```
//!
//! `ask` never returns an error: every query-time problem comes back as an
//! [`Answer`] variant so an interactive session can keep going.

use super::PromptBuilder;
use crate::chunking::{Chunker, ChunkingConfig, SlidingWindowChunker};
use crate::config::{Prompts, Settings};
use crate::document::{self, Document};
use crate::embedding::{create_embedder, Embedder};
use crate::error::{Result, StoryQaError};
use crate::generation::{
    candidates_from_specs, ActiveBackend, AnswerModel, BackendCandidate, ProbeConfig,
    ProbeReport,
};
use crate::index::{Retriever, ScoredChunk, VectorIndex};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Lifecycle state of a [`QaPipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Loading,
    Ready,
    Degraded,
    Failed,
}

impl PipelineState {
    /// Whether retrieval can be served.
    pub fn has_index(&self) -> bool {
        matches!(self, PipelineState::Ready | PipelineState::Degraded)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::Uninitialized => write!(f, "uninitialized"),
            PipelineState::Loading => write!(f, "loading"),
            PipelineState::Ready => write!(f, "ready"),
            PipelineState::Degraded => write!(f, "degraded"),
            PipelineState::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of a question.
#[derive(Debug, Clone)]
pub enum Answer {
    /// Generated answer and the chunks it was based on.
    Answered {
        text: String,
        sources: Vec<ScoredChunk>,
    },
    /// The pipeline cannot generate answers in its current state.
    NotReady { state: PipelineState, reason: String },
    /// The question could not be matched against the index.
    RetrievalError { message: String },
    /// The active backend failed on this question.
    GenerationError { message: String },
}

impl Answer {
    pub fn is_answered(&self) -> bool {
        matches!(self, Answer::Answered { .. })
    }

    /// Answer text, if one was generated.
    pub fn text(&self) -> Option<&str> {
        match self {
            Answer::Answered { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Source chunks, empty unless answered.
    pub fn sources(&self) -> &[ScoredChunk] {
        match self {
            Answer::Answered { sources, .. } => sources,
            _ => &[],
        }
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Answer::Answered { text, .. } => write!(f, "{}", text),
            Answer::NotReady { reason, .. } => write!(f, "System not ready ({})", reason),
            Answer::RetrievalError { message } | Answer::GenerationError { message } => {
                write!(f, "Error: {}", message)
            }
        }
    }
}

/// Counters describing what was loaded.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub pages: usize,
    pub chunks: usize,
    pub indexed: usize,
    pub skipped: usize,
    /// Label of the selected generation backend.
    pub backend: Option<String>,
}

/// Pipeline parameters that are fixed before loading.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub chunking: ChunkingConfig,
    /// Number of chunks retrieved per question.
    pub k: usize,
    pub probe: ProbeConfig,
    pub prompts: Prompts,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            k: Retriever::DEFAULT_K,
            probe: ProbeConfig::default(),
            prompts: Prompts::default(),
        }
    }
}

impl PipelineOptions {
    /// Derive options from settings, loading custom prompts.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            chunking: ChunkingConfig::try_from(&settings.chunking)?,
            k: settings.retrieval.k,
            probe: ProbeConfig::from(&settings.generation),
            prompts: Prompts::load(
                settings.prompts.custom_dir.as_deref(),
                Some(&settings.prompts.variables),
            )?,
        })
    }
}

/// Parts that only exist once loading succeeded.
struct Loaded {
    retriever: Retriever,
    answer_model: AnswerModel,
}

/// Retrieval-augmented question answering over one document.
pub struct QaPipeline {
    state: PipelineState,
    options: PipelineOptions,
    embedder: Arc<dyn Embedder>,
    candidates: Vec<BackendCandidate>,
    prompt_builder: PromptBuilder,
    loaded: Option<Loaded>,
    failure: Option<String>,
    stats: PipelineStats,
}

impl QaPipeline {
    /// Create an uninitialized pipeline from its collaborators.
    pub fn new(
        options: PipelineOptions,
        embedder: Arc<dyn Embedder>,
        candidates: Vec<BackendCandidate>,
    ) -> Self {
        let prompt_builder = PromptBuilder::new(options.prompts.clone());
        Self {
            state: PipelineState::Uninitialized,
            options,
            embedder,
            candidates,
            prompt_builder,
            loaded: None,
            failure: None,
            stats: PipelineStats::default(),
        }
    }

    /// Create an uninitialized pipeline with the collaborators named in settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let options = PipelineOptions::from_settings(settings)?;
        let embedder = create_embedder(&settings.embedding)?;
        let candidates = candidates_from_specs(&settings.generation.backends)?;
        Ok(Self::new(options, embedder, candidates))
    }

    /// Create a pipeline and load `path`, propagating construction failures.
    pub async fn open(settings: &Settings, path: &Path) -> Result<Self> {
        let mut pipeline = Self::from_settings(settings)?;
        pipeline.load(path).await?;
        Ok(pipeline)
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == PipelineState::Ready
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Why loading failed, when the pipeline is `Failed`.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Which backend slot is serving generation.
    pub fn active_backend(&self) -> ActiveBackend {
        self.loaded
            .as_ref()
            .map(|l| l.answer_model.active_backend())
            .unwrap_or(ActiveBackend::None)
    }

    /// Startup probe results, empty before loading.
    pub fn probe_reports(&self) -> &[ProbeReport] {
        self.loaded
            .as_ref()
            .map(|l| l.answer_model.probe_reports())
            .unwrap_or(&[])
    }

    /// Load the document at `path` and prepare the pipeline.
    pub async fn load(&mut self, path: &Path) -> Result<()> {
        self.begin_loading()?;
        match document::load_document(path) {
            Ok(document) => self.finish_loading(document).await,
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Prepare the pipeline from an already loaded document.
    pub async fn load_document(&mut self, document: Document) -> Result<()> {
        self.begin_loading()?;
        self.finish_loading(document).await
    }

    fn begin_loading(&mut self) -> Result<()> {
        if self.state != PipelineState::Uninitialized {
            return Err(StoryQaError::Config(format!(
                "pipeline can only be loaded once (state: {})",
                self.state
            )));
        }
        self.state = PipelineState::Loading;
        Ok(())
    }

    fn fail(&mut self, e: StoryQaError) -> StoryQaError {
        error!("Pipeline failed to load: {}", e);
        self.state = PipelineState::Failed;
        self.failure = Some(e.to_string());
        e
    }

    #[instrument(skip_all, fields(source = %document.source.display()))]
    async fn finish_loading(&mut self, document: Document) -> Result<()> {
        let index = match self.build_index(&document).await {
            Ok(index) => index,
            Err(e) => return Err(self.fail(e)),
        };

        let retriever = match Retriever::new(Arc::new(index), self.embedder.clone(), self.options.k)
        {
            Ok(retriever) => retriever,
            Err(e) => return Err(self.fail(e)),
        };

        let candidates = std::mem::take(&mut self.candidates);
        let answer_model = AnswerModel::initialize(candidates, &self.options.probe).await;

        self.stats.backend = answer_model.active_label().map(str::to_string);
        self.state = if answer_model.is_ready() {
            PipelineState::Ready
        } else {
            warn!("Generation unavailable; only retrieval will work");
            PipelineState::Degraded
        };
        self.loaded = Some(Loaded {
            retriever,
            answer_model,
        });

        info!("Pipeline {}: {:?}", self.state, self.stats);
        Ok(())
    }

    async fn build_index(&mut self, document: &Document) -> Result<VectorIndex> {
        if document.pages.is_empty() {
            return Err(StoryQaError::Ingestion(format!(
                "Document has no pages: {}",
                document.source.display()
            )));
        }
        if !document.has_text() {
            return Err(StoryQaError::Ingestion(format!(
                "Document contains no text: {}",
                document.source.display()
            )));
        }

        let chunks = SlidingWindowChunker::new().chunk(&document.pages, &self.options.chunking)?;
        self.stats.pages = document.page_count();
        self.stats.chunks = chunks.len();

        let index = VectorIndex::build(chunks, self.embedder.as_ref()).await?;
        self.stats.indexed = index.len();
        self.stats.skipped = index.skipped().len();
        Ok(index)
    }

    /// Answer a question about the document.
    ///
    /// Outside `Ready` this returns [`Answer::NotReady`] without touching the
    /// retriever or any backend.
    #[instrument(skip(self), fields(state = %self.state))]
    pub async fn ask(&self, question: &str) -> Answer {
        let loaded = match (&self.state, &self.loaded) {
            (PipelineState::Ready, Some(loaded)) => loaded,
            _ => {
                return Answer::NotReady {
                    state: self.state,
                    reason: self.not_ready_reason(),
                }
            }
        };

        let sources = match loaded.retriever.retrieve(question).await {
            Ok(sources) => sources,
            Err(e) => {
                warn!("Retrieval failed: {}", e);
                return Answer::RetrievalError {
                    message: e.to_string(),
                };
            }
        };

        let chunks: Vec<_> = sources.iter().map(|s| s.chunk.clone()).collect();
        let prompt = self.prompt_builder.build(&chunks, question);

        match loaded.answer_model.generate(prompt.text()).await {
            Ok(text) => Answer::Answered { text, sources },
            Err(e) => {
                warn!("Generation failed: {}", e);
                Answer::GenerationError {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Retrieve the chunks most relevant to `query` without generating.
    ///
    /// Works in both `Ready` and `Degraded`.
    pub async fn search(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        match &self.loaded {
            Some(loaded) if self.state.has_index() => loaded.retriever.retrieve(query).await,
            _ => Err(StoryQaError::Ingestion(format!(
                "no index available (state: {})",
                self.state
            ))),
        }
    }

    fn not_ready_reason(&self) -> String {
        match self.state {
            PipelineState::Degraded => "LLM failed to initialize".to_string(),
            PipelineState::Failed => format!(
                "document failed to load: {}",
                self.failure.as_deref().unwrap_or("unknown error")
            ),
            PipelineState::Uninitialized | PipelineState::Loading => {
                "no document loaded".to_string()
            }
            PipelineState::Ready => "pipeline is ready".to_string(),
        }
    }
}
