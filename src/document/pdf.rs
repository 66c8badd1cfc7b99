//! PDF document loader.

use super::{Document, DocumentLoader, Page};
use crate::error::{Result, StoryQaError};
use std::path::Path;
use tracing::{debug, warn};

/// Loader for PDF files, one page per PDF page.
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for PdfLoader {
    fn can_handle(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }

    fn load(&self, path: &Path) -> Result<Document> {
        let pdf = lopdf::Document::load(path).map_err(|e| {
            StoryQaError::Ingestion(format!("Failed to load PDF {}: {}", path.display(), e))
        })?;

        if pdf.is_encrypted() {
            return Err(StoryQaError::Ingestion(format!(
                "PDF is encrypted: {}",
                path.display()
            )));
        }

        // get_pages is keyed by 1-based page number in document order
        let mut pages = Vec::new();
        for (index, page_number) in pdf.get_pages().into_keys().enumerate() {
            let text = match pdf.extract_text(&[page_number]) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Could not extract text from page {}: {}", page_number, e);
                    String::new()
                }
            };
            debug!("Page {}: {} characters", page_number, text.chars().count());
            pages.push(Page::new(index, text));
        }

        Ok(Document::new(path, pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Write a PDF with one text line per page.
    fn write_pdf(path: &Path, page_texts: &[&str]) {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Count" => count,
            "Kids" => kids,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_pages_extracted_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wish_dragon.pdf");
        write_pdf(
            &path,
            &["Din found a teapot.", "Pax granted three wishes.", "The end."],
        );

        let doc = PdfLoader::new().load(&path).unwrap();
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.source, path);

        let indexes: Vec<usize> = doc.pages.iter().map(|p| p.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert!(doc.pages[0].text.contains("Din found a teapot."));
        assert!(doc.pages[1].text.contains("Pax granted three wishes."));
        assert!(doc.pages[2].text.contains("The end."));
        assert!(!doc.pages[0].text.contains("Pax"));
    }

    #[test]
    fn test_pdf_goes_through_load_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.pdf");
        write_pdf(&path, &["Once upon a time."]);

        let doc = crate::document::load_document(&path).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert!(doc.text().contains("Once upon a time."));
    }

    #[test]
    fn test_garbage_pdf_is_ingestion_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wish_dragon.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = PdfLoader::new().load(&path).unwrap_err();
        assert!(matches!(err, StoryQaError::Ingestion(_)));
    }
}
