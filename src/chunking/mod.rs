//! Document chunking for retrieval.
//!
//! Splits page text into overlapping fixed-size segments. Sizes and offsets
//! are counted in characters, not bytes.

mod window;

pub use window::SlidingWindowChunker;

use crate::config::ChunkingSettings;
use crate::document::Page;
use crate::error::{Result, StoryQaError};
use serde::{Deserialize, Serialize};

/// A contiguous slice of document text, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content of this chunk.
    pub text: String,
    /// Page on which the chunk starts.
    pub source_page_index: usize,
    /// Character offset of the chunk in the concatenated document text.
    pub offset: usize,
    /// Position of this chunk in the document.
    pub order: usize,
}

impl Chunk {
    /// Number of characters in the chunk.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Validated chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkingConfig {
    /// Create a config; `chunk_size` must be greater than `overlap`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size <= overlap {
            return Err(StoryQaError::Config(format!(
                "chunk_size ({}) must be greater than overlap ({})",
                chunk_size, overlap
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between the starts of consecutive chunks.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

impl TryFrom<&ChunkingSettings> for ChunkingConfig {
    type Error = StoryQaError;

    fn try_from(settings: &ChunkingSettings) -> Result<Self> {
        Self::new(settings.chunk_size, settings.overlap)
    }
}

/// Trait for chunking implementations.
pub trait Chunker: Send + Sync {
    /// Split pages into ordered chunks.
    fn chunk(&self, pages: &[Page], config: &ChunkingConfig) -> Result<Vec<Chunk>>;
}

/// Split pages with the sliding-window chunker.
pub fn split(pages: &[Page], chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    let config = ChunkingConfig::new(chunk_size, overlap)?;
    SlidingWindowChunker::new().chunk(pages, &config)
}
