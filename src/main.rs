//! StoryQA CLI entry point.

use anyhow::Result;
use clap::Parser;
use storyqa::cli::{commands, Cli, Commands};
use storyqa::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("storyqa={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match &cli.command {
        Commands::Chat { document } => {
            commands::run_chat(document.as_deref(), settings).await?;
        }

        Commands::Ask {
            question,
            document,
            k,
        } => {
            commands::run_ask(question, document.as_deref(), *k, settings).await?;
        }

        Commands::Search { query, document, k } => {
            commands::run_search(query, document.as_deref(), *k, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
