//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod doctor;
mod search;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use search::run_search;

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::error::StoryQaError;
use crate::rag::QaPipeline;
use anyhow::{Context, Result};

/// Load the document into a new pipeline behind a spinner.
///
/// `k` overrides `retrieval.k` for this run. Errors are returned, not
/// printed; only a follow-up hint is shown here.
pub(crate) async fn open_pipeline(
    document: Option<&str>,
    k: Option<usize>,
    mut settings: Settings,
) -> Result<QaPipeline> {
    if let Some(k) = k {
        settings.retrieval.k = k;
    }
    let path = settings.document_path(document);

    if let Err(e) = preflight::check(&settings, &path) {
        Output::info(load_hint(&e));
        return Err(e.into());
    }

    let spinner = Output::spinner(&format!("Loading {}...", path.display()));
    let result = QaPipeline::open(&settings, &path).await;
    spinner.finish_and_clear();

    let pipeline = result
        .inspect_err(|e| Output::info(load_hint(e)))
        .with_context(|| format!("Failed to load {}", path.display()))?;

    let stats = pipeline.stats();
    tracing::info!(
        "Indexed {} of {} chunks from {} pages",
        stats.indexed,
        stats.chunks,
        stats.pages
    );
    Ok(pipeline)
}

/// What to try next after a load failure.
///
/// Fatal errors point at the input; the rest are service problems that
/// `doctor` can narrow down.
fn load_hint(error: &StoryQaError) -> &'static str {
    if error.is_fatal() {
        "Check the document path and the config file ('storyqa config show')."
    } else {
        "Run 'storyqa doctor' for detailed diagnostics."
    }
}
