//! Interactive question loop.

use super::open_pipeline;
use crate::cli::Output;
use crate::config::{BackendProvider, Settings};
use crate::rag::{Answer, PipelineState};
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Word that ends the session, compared case-insensitively.
const EXIT_WORD: &str = "exit";

/// Run the interactive chat command.
pub async fn run_chat(document: Option<&str>, settings: Settings) -> Result<()> {
    let hints = setup_hints(&settings);
    let pipeline = open_pipeline(document, None, settings).await?;

    println!("\n{}", style("Story Q&A System").bold().cyan());
    println!(
        "{}\n",
        style(format!("Type your questions, or '{}' to quit.", EXIT_WORD)).dim()
    );

    if pipeline.state() == PipelineState::Degraded {
        Output::warning("System initialized with limited functionality");
        Output::info("Passages can still be searched, but answers are disabled.");
        for hint in &hints {
            Output::list_item(hint);
        }
        println!();
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("Your question:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if is_exit(input) {
            Output::info("Goodbye!");
            break;
        }

        let answer = pipeline.ask(input).await;
        match &answer {
            Answer::Answered { text, .. } => {
                println!("\n{} {}\n", style("Answer:").cyan().bold(), text);
            }
            Answer::NotReady { .. } => Output::warning(&answer.to_string()),
            Answer::RetrievalError { .. } | Answer::GenerationError { .. } => {
                Output::error(&answer.to_string())
            }
        }
    }

    Ok(())
}

fn is_exit(input: &str) -> bool {
    input.eq_ignore_ascii_case(EXIT_WORD)
}

/// Setup hints shown when no backend could be started.
fn setup_hints(settings: &Settings) -> Vec<String> {
    let mut hints = Vec::new();
    let ollama_models: Vec<&str> = settings
        .generation
        .backends
        .iter()
        .filter(|b| b.provider == BackendProvider::Ollama)
        .map(|b| b.model.as_str())
        .collect();

    if !ollama_models.is_empty() {
        hints.push("Install Ollama: https://ollama.ai/download".to_string());
        for model in ollama_models {
            hints.push(format!("Run: `ollama pull {}`", model));
        }
    }
    if settings
        .generation
        .backends
        .iter()
        .any(|b| b.provider == BackendProvider::OpenAI)
    {
        hints.push("Set OPENAI_API_KEY for OpenAI backends".to_string());
    }
    if hints.is_empty() {
        hints.push("Add a backend under [[generation.backends]] in the config file".to_string());
    }
    hints
}
