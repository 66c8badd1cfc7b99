//! Document loading for StoryQA.
//!
//! A loader turns a path into an ordered sequence of text pages. The rest of
//! the pipeline never looks at the file format.

mod pdf;
mod text;

pub use pdf::PdfLoader;
pub use text::TextLoader;

use crate::error::{Result, StoryQaError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One page of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based page number.
    pub index: usize,
    /// Extracted text.
    pub text: String,
}

impl Page {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// A loaded document: pages in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Where the document came from.
    pub source: PathBuf,
    /// Pages in order.
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a document from pages.
    pub fn new(source: impl Into<PathBuf>, pages: Vec<Page>) -> Self {
        Self {
            source: source.into(),
            pages,
        }
    }

    /// Build a document from raw page strings, numbering them in order.
    pub fn from_texts<S: Into<String>>(source: impl Into<PathBuf>, texts: Vec<S>) -> Self {
        let pages = texts
            .into_iter()
            .enumerate()
            .map(|(i, t)| Page::new(i, t))
            .collect();
        Self::new(source, pages)
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Full text, pages concatenated without separators.
    pub fn text(&self) -> String {
        self.pages.iter().map(|p| p.text.as_str()).collect()
    }

    /// Whether the document has any non-whitespace text.
    pub fn has_text(&self) -> bool {
        self.pages.iter().any(|p| !p.text.trim().is_empty())
    }
}

/// Trait for document loaders.
pub trait DocumentLoader: Send + Sync {
    /// Check if this loader can handle the given path.
    fn can_handle(&self, path: &Path) -> bool;

    /// Load the document at `path`.
    fn load(&self, path: &Path) -> Result<Document>;
}

/// Pick a loader for the path: PDF by extension, plain text otherwise.
pub fn detect_loader(path: &Path) -> Box<dyn DocumentLoader> {
    let pdf = PdfLoader::new();
    if pdf.can_handle(path) {
        return Box::new(pdf);
    }
    Box::new(TextLoader::new())
}

/// Fail with an ingestion error unless the document exists.
pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(StoryQaError::Ingestion(format!(
            "Missing document: {}",
            path.display()
        )))
    }
}

/// Load a document, checking that it exists and contains text.
pub fn load_document(path: &Path) -> Result<Document> {
    ensure_exists(path)?;

    let document = detect_loader(path).load(path)?;

    if document.pages.is_empty() {
        return Err(StoryQaError::Ingestion(format!(
            "Document has no pages: {}",
            path.display()
        )));
    }
    if !document.has_text() {
        return Err(StoryQaError::Ingestion(format!(
            "No text could be extracted from {}",
            path.display()
        )));
    }

    tracing::info!(
        "Loaded {} ({} pages)",
        path.display(),
        document.page_count()
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_text_concatenates_pages() {
        let doc = Document::from_texts("story.txt", vec!["Once upon ", "a time."]);
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[1].index, 1);
        assert_eq!(doc.text(), "Once upon a time.");
    }

    #[test]
    fn test_missing_document_is_ingestion_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_document(&dir.path().join("wish_dragon.pdf")).unwrap_err();
        assert!(matches!(err, StoryQaError::Ingestion(_)));
        assert!(err.to_string().contains("Missing document"));
    }

    #[test]
    fn test_blank_document_is_ingestion_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "   \n\n  ").unwrap();

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, StoryQaError::Ingestion(_)));
    }

    #[test]
    fn test_loader_detection() {
        assert!(PdfLoader::new().can_handle(Path::new("story.PDF")));
        assert!(!PdfLoader::new().can_handle(Path::new("story.txt")));
        assert!(TextLoader::new().can_handle(Path::new("story.md")));
    }

    #[test]
    fn test_load_text_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.txt");
        std::fs::write(&path, "Page one.\x0cPage two.").unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[0].text, "Page one.");
        assert_eq!(doc.pages[1].text, "Page two.");
        assert_eq!(doc.source, path);
    }
}
