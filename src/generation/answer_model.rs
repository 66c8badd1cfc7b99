//! Ordered fallback over generation backends.
//!
//! Each candidate is probed once at startup, in order. The first one that
//! answers becomes the active backend for the lifetime of the model; if none
//! answers the model is not ready. Nothing is re-probed at query time.

use super::GenerationBackend;
use crate::config::GenerationSettings;
use crate::error::{Result, StoryQaError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Which candidate, if any, is serving generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveBackend {
    /// The first candidate.
    Primary,
    /// A later candidate.
    Fallback,
    None,
}

impl std::fmt::Display for ActiveBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActiveBackend::Primary => write!(f, "primary"),
            ActiveBackend::Fallback => write!(f, "fallback"),
            ActiveBackend::None => write!(f, "none"),
        }
    }
}

/// A backend offered to the fallback chain.
#[derive(Clone)]
pub struct BackendCandidate {
    backend: Arc<dyn GenerationBackend>,
    label: String,
    max_prompt_chars: Option<usize>,
}

impl BackendCandidate {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        let label = backend.name().to_string();
        Self {
            backend,
            label,
            max_prompt_chars: None,
        }
    }

    /// Override the display label (defaults to the backend name).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Reject prompts longer than `limit` characters instead of sending them.
    pub fn with_max_prompt_chars(mut self, limit: Option<usize>) -> Self {
        self.max_prompt_chars = limit;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Result of probing one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Ready,
    Failed(String),
    TimedOut(Duration),
    /// An earlier candidate was selected first.
    NotAttempted,
}

/// Probe record for one candidate.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// Position in the candidate list (0 is primary).
    pub position: usize,
    pub label: String,
    pub outcome: ProbeOutcome,
}

impl ProbeReport {
    pub fn is_ready(&self) -> bool {
        self.outcome == ProbeOutcome::Ready
    }
}

/// Probe parameters.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Upper bound on each probe call.
    pub timeout: Duration,
    /// Trivial prompt used as the liveness check.
    pub prompt: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            prompt: "test".to_string(),
        }
    }
}

impl From<&GenerationSettings> for ProbeConfig {
    fn from(settings: &GenerationSettings) -> Self {
        Self {
            timeout: Duration::from_secs(settings.probe_timeout_secs),
            prompt: settings.probe_prompt.clone(),
        }
    }
}

/// Generation capability with its backend fixed at initialization.
pub struct AnswerModel {
    active: Option<(usize, BackendCandidate)>,
    probes: Vec<ProbeReport>,
}

impl AnswerModel {
    /// Probe candidates in order and keep the first that answers.
    ///
    /// Never fails: when every candidate fails the model is simply not ready.
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub async fn initialize(candidates: Vec<BackendCandidate>, config: &ProbeConfig) -> Self {
        let mut active = None;
        let mut probes = Vec::with_capacity(candidates.len());

        for (position, candidate) in candidates.into_iter().enumerate() {
            if active.is_some() {
                probes.push(ProbeReport {
                    position,
                    label: candidate.label.clone(),
                    outcome: ProbeOutcome::NotAttempted,
                });
                continue;
            }

            let outcome = probe(&candidate, config).await;
            let ready = outcome == ProbeOutcome::Ready;
            probes.push(ProbeReport {
                position,
                label: candidate.label.clone(),
                outcome,
            });

            if ready {
                info!("Using {} backend: {}", slot(position), candidate.label);
                active = Some((position, candidate));
            }
        }

        if active.is_none() {
            warn!("No generation backend available; answers are disabled");
        }

        Self { active, probes }
    }

    /// Probe every candidate, without selecting one.
    pub async fn probe_all(candidates: &[BackendCandidate], config: &ProbeConfig) -> Vec<ProbeReport> {
        let mut reports = Vec::with_capacity(candidates.len());
        for (position, candidate) in candidates.iter().enumerate() {
            reports.push(ProbeReport {
                position,
                label: candidate.label.clone(),
                outcome: probe(candidate, config).await,
            });
        }
        reports
    }

    /// A model with no backend.
    pub fn unavailable() -> Self {
        Self {
            active: None,
            probes: Vec::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_backend(&self) -> ActiveBackend {
        match &self.active {
            Some((position, _)) => slot(*position),
            None => ActiveBackend::None,
        }
    }

    /// Label of the selected backend.
    pub fn active_label(&self) -> Option<&str> {
        self.active.as_ref().map(|(_, c)| c.label.as_str())
    }

    /// What happened to each candidate during initialization.
    pub fn probe_reports(&self) -> &[ProbeReport] {
        &self.probes
    }

    /// Generate with the active backend.
    ///
    /// Failures are per call and never change which backend is active.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let Some((_, candidate)) = &self.active else {
            return Err(StoryQaError::BackendUnavailable(
                "all generation backends failed their startup probe".to_string(),
            ));
        };

        if let Some(limit) = candidate.max_prompt_chars {
            let length = prompt.chars().count();
            if length > limit {
                return Err(StoryQaError::ContextTooLarge { length, limit });
            }
        }

        candidate
            .backend
            .generate(prompt)
            .await
            .map_err(|e| StoryQaError::Generation(format!("{}: {}", candidate.label, e)))
    }
}

fn slot(position: usize) -> ActiveBackend {
    if position == 0 {
        ActiveBackend::Primary
    } else {
        ActiveBackend::Fallback
    }
}

async fn probe(candidate: &BackendCandidate, config: &ProbeConfig) -> ProbeOutcome {
    match tokio::time::timeout(config.timeout, candidate.backend.generate(&config.prompt)).await {
        Ok(Ok(_)) => ProbeOutcome::Ready,
        Ok(Err(e)) => {
            warn!("{} not available: {}", candidate.label, e);
            ProbeOutcome::Failed(e.to_string())
        }
        Err(_) => {
            warn!("{} did not answer within {:?}", candidate.label, config.timeout);
            ProbeOutcome::TimedOut(config.timeout)
        }
    }
}
