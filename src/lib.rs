//! StoryQA - question answering over a story document
//!
//! Loads a single document, splits it into overlapping chunks, embeds them
//! into an in-memory vector index and answers questions by handing the most
//! relevant chunks to a language model.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `document` - Document loading (PDF, plain text)
//! - `chunking` - Sliding-window chunking
//! - `embedding` - Embedding generation
//! - `index` - Vector index and top-k retrieval
//! - `generation` - Generation backends and the startup fallback chain
//! - `rag` - Prompt assembly and the question-answering pipeline
//!
//! # Example
//!
//! ```rust,no_run
//! use storyqa::config::Settings;
//! use storyqa::rag::QaPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let path = settings.document_path(None);
//!     let pipeline = QaPipeline::open(&settings, &path).await?;
//!
//!     let answer = pipeline.ask("Who is the main character?").await;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod ollama;
pub mod openai;
pub mod rag;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Result, StoryQaError};
