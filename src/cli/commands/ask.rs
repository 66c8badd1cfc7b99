//! Ask command implementation.

use super::open_pipeline;
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::Answer;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    document: Option<&str>,
    k: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let pipeline = open_pipeline(document, k, settings).await?;

    let spinner = Output::spinner("Thinking...");
    let answer = pipeline.ask(question).await;
    spinner.finish_and_clear();

    match &answer {
        Answer::Answered { text, sources } => {
            println!("\n{}\n", text);

            if !sources.is_empty() {
                Output::header("Sources");
                for (rank, source) in sources.iter().enumerate() {
                    Output::passage(
                        rank + 1,
                        source.chunk.source_page_index,
                        source.score,
                        &source.chunk.text,
                    );
                }
            }
            Ok(())
        }
        Answer::NotReady { .. } => {
            Output::warning(&answer.to_string());
            Ok(())
        }
        Answer::RetrievalError { .. } | Answer::GenerationError { .. } => {
            Output::error(&answer.to_string());
            anyhow::bail!("question could not be answered")
        }
    }
}
