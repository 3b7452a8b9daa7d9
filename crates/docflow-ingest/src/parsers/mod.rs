//! Text extraction from source documents.

mod pdf;

pub use pdf::{clean_pdf_text, PdfTextExtractor};

use crate::error::IngestResult;
use std::path::Path;

/// Trait for document text extractors.
pub trait TextExtractor: Send + Sync {
    /// Text of the first page only, used as the classification sample.
    fn first_page(&self, path: &Path) -> IngestResult<String>;

    /// Text of every page, used for field extraction.
    fn full_text(&self, path: &Path) -> IngestResult<String>;

    /// Get the supported file extensions.
    fn extensions(&self) -> &[&str];

    /// Check if this extractor supports the given extension.
    fn supports(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
