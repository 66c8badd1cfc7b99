//! Search command implementation.

use super::open_pipeline;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::{Context, Result};

/// Run the search command.
pub async fn run_search(
    query: &str,
    document: Option<&str>,
    k: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let pipeline = open_pipeline(document, k, settings).await?;

    let spinner = Output::spinner("Searching...");
    let results = pipeline.search(query).await;
    spinner.finish_and_clear();

    let results = results.context("Search failed")?;

    if results.is_empty() {
        Output::warning("No results found.");
        return Ok(());
    }

    Output::header(&format!("Search results for: {}", query));

    for (rank, result) in results.iter().enumerate() {
        Output::passage(
            rank + 1,
            result.chunk.source_page_index,
            result.score,
            &result.chunk.text,
        );
    }

    println!();
    Ok(())
}
