//! CLI module for StoryQA.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// StoryQA - ask questions about a story
///
/// Indexes a single document (PDF or text) and answers questions about it
/// with a local or hosted language model.
#[derive(Parser, Debug)]
#[command(name = "storyqa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive question session (type 'exit' to quit)
    Chat {
        /// Document to load (defaults to document.default_path)
        #[arg(short, long)]
        document: Option<String>,
    },

    /// Ask a single question
    Ask {
        /// The question to ask
        question: String,

        /// Document to load (defaults to document.default_path)
        #[arg(short, long)]
        document: Option<String>,

        /// Number of context chunks to retrieve
        #[arg(short)]
        k: Option<usize>,
    },

    /// Show the passages most relevant to a query, without generating
    Search {
        /// Search query
        query: String,

        /// Document to load (defaults to document.default_path)
        #[arg(short, long)]
        document: Option<String>,

        /// Number of passages to show
        #[arg(short)]
        k: Option<usize>,
    },

    /// Probe every configured generation backend
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
