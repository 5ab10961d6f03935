//! Plain-text document extraction
//!
//! Stands in for PDF/OCR extractors: reads a UTF-8 file and splits it into
//! pages on a separator character (form feed by default).

use std::path::Path;

use async_trait::async_trait;
use fkg_core::{DocumentText, FkgError, Result, TextExtractor};

pub const FORM_FEED: char = '\x0c';

pub struct PlainTextExtractor {
    page_break: char,
}

impl PlainTextExtractor {
    pub fn new(page_break: char) -> Self {
        Self { page_break }
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new(FORM_FEED)
    }
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<DocumentText> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| FkgError::ExtractionError(format!("{}: {e}", path.display())))?;
        let text = String::from_utf8(bytes).map_err(|_| {
            FkgError::ExtractionError(format!("{} is not valid UTF-8", path.display()))
        })?;
        Ok(DocumentText::from_pages(text, self.page_break))
    }

    fn name(&self) -> &str {
        "plain-text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_split_on_form_feed() {
        let dir = std::env::temp_dir().join(format!("fkg-text-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("filing.txt");
        std::fs::write(&path, "Page one.\x0cPage two.").unwrap();

        let doc = tokio_test::block_on(PlainTextExtractor::default().extract_text(&path)).unwrap();
        assert_eq!(doc.page_count(), 2);
        let pages: Vec<_> = doc.pages().collect();
        assert_eq!(pages[1], (2, "Page two."));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_extraction_error() {
        let result = tokio_test::block_on(
            PlainTextExtractor::default().extract_text(Path::new("/nonexistent/filing.txt")),
        );
        assert!(matches!(result, Err(FkgError::ExtractionError(_))));
    }
}
