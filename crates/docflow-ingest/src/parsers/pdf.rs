//! PDF text extraction.

use super::TextExtractor;
use crate::error::{IngestError, IngestResult};
use std::path::Path;
use tracing::debug;

/// Extractor for PDF files.
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self
    }

    fn pages(&self, path: &Path) -> IngestResult<Vec<String>> {
        if !path.exists() {
            return Err(IngestError::FileNotFound(path.to_path_buf()));
        }

        debug!("Extracting text from PDF: {:?}", path);

        pdf_extract::extract_text_by_pages(path).map_err(|e| IngestError::ParseError {
            path: path.to_path_buf(),
            message: format!("Failed to extract text from PDF: {}", e),
        })
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfTextExtractor {
    fn first_page(&self, path: &Path) -> IngestResult<String> {
        let pages = self.pages(path)?;
        let text = pages.first().map(|page| clean_pdf_text(page)).unwrap_or_default();
        Ok(text.trim().to_string())
    }

    fn full_text(&self, path: &Path) -> IngestResult<String> {
        let pages = self.pages(path)?;
        let text = pages
            .iter()
            .map(|page| clean_pdf_text(page))
            .collect::<Vec<_>>()
            .join("\n");

        debug!("Extracted {} characters from {} pages", text.len(), pages.len());
        Ok(text.trim().to_string())
    }

    fn extensions(&self) -> &[&str] {
        &["pdf"]
    }
}

/// Clean up extracted PDF text.
pub fn clean_pdf_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        // Collapse runs of empty lines into one
        .fold(Vec::new(), |mut acc, line| {
            let last_was_empty = acc.last().map(|s: &String| s.is_empty()).unwrap_or(false);
            if !(line.is_empty() && last_was_empty) {
                acc.push(line.to_string());
            }
            acc
        })
        .join("\n")
        .replace('\x0C', "\n")
}
