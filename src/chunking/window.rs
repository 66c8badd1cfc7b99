//! Sliding-window chunking implementation.
//!
//! Pages are concatenated and a window of `chunk_size` characters advances by
//! `chunk_size - overlap` each step. A chunk may span a page boundary; its
//! `source_page_index` is the page it starts on.

use super::{Chunk, Chunker, ChunkingConfig};
use crate::document::Page;
use crate::error::Result;
use tracing::debug;

/// Fixed-size overlapping window chunker.
pub struct SlidingWindowChunker;

impl SlidingWindowChunker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SlidingWindowChunker {
    fn default() -> Self {
        Self::new()
    }
}

/// Character range `[start, end)` of one page in the concatenated text.
struct PageSpan {
    index: usize,
    start: usize,
    end: usize,
}

fn page_spans(pages: &[Page]) -> Vec<PageSpan> {
    let mut spans = Vec::with_capacity(pages.len());
    let mut cursor = 0;
    for page in pages {
        let len = page.text.chars().count();
        spans.push(PageSpan {
            index: page.index,
            start: cursor,
            end: cursor + len,
        });
        cursor += len;
    }
    spans
}

/// Page containing the character at `offset`. Empty pages never match.
fn page_at(spans: &[PageSpan], offset: usize) -> usize {
    let pos = spans.partition_point(|s| s.end <= offset);
    spans.get(pos).map(|s| s.index).unwrap_or(0)
}

impl Chunker for SlidingWindowChunker {
    fn chunk(&self, pages: &[Page], config: &ChunkingConfig) -> Result<Vec<Chunk>> {
        let text: Vec<char> = pages.iter().flat_map(|p| p.text.chars()).collect();
        let spans = page_spans(pages);
        let mut chunks = Vec::new();

        if text.is_empty() {
            return Ok(chunks);
        }

        let mut start = 0;
        loop {
            let end = (start + config.chunk_size()).min(text.len());
            chunks.push(Chunk {
                text: text[start..end].iter().collect(),
                source_page_index: page_at(&spans, start),
                offset: start,
                order: chunks.len(),
            });

            if end == text.len() {
                break;
            }
            start += config.stride();
        }

        debug!(
            "Split {} characters from {} pages into {} chunks",
            text.len(),
            pages.len(),
            chunks.len()
        );
        Ok(chunks)
    }
}
