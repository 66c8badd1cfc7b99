//! RAG (Retrieval-Augmented Generation) question answering.
//!
//! Ties retrieval, prompt assembly and generation together behind
//! [`QaPipeline`].

mod pipeline;
mod prompt;

pub use pipeline::{Answer, PipelineOptions, PipelineState, PipelineStats, QaPipeline};
pub use prompt::{Prompt, PromptBuilder};
