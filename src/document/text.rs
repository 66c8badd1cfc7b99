//! Plain-text document loader.
//!
//! Form feeds (`\x0c`) separate pages; a file without them is a single page.

use super::{Document, DocumentLoader, Page};
use crate::error::{Result, StoryQaError};
use std::path::Path;

const PAGE_BREAK: char = '\x0c';

/// Loader for UTF-8 text files.
pub struct TextLoader;

impl TextLoader {
    pub fn new() -> Self {
        Self
    }

    /// Split raw text into pages at form feeds.
    pub fn split_pages(content: &str) -> Vec<Page> {
        content
            .split(PAGE_BREAK)
            .enumerate()
            .map(|(i, text)| Page::new(i, text))
            .collect()
    }
}

impl Default for TextLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for TextLoader {
    fn can_handle(&self, path: &Path) -> bool {
        !path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }

    fn load(&self, path: &Path) -> Result<Document> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoryQaError::Ingestion(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Ok(Document::new(path, Self::split_pages(&content)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page_without_form_feed() {
        let pages = TextLoader::split_pages("Once upon a time.");
        assert_eq!(pages, vec![Page::new(0, "Once upon a time.")]);
    }

    #[test]
    fn test_pages_keep_their_text_verbatim() {
        let pages = TextLoader::split_pages("one\n\x0c two\n\x0cthree");
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].text, "one\n");
        assert_eq!(pages[1].text, " two\n");
        assert_eq!(pages[2].index, 2);
    }

    #[test]
    fn test_invalid_utf8_is_ingestion_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = TextLoader::new().load(&path).unwrap_err();
        assert!(matches!(err, StoryQaError::Ingestion(_)));
    }
}
