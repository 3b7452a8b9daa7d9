//! Docflow Ingest - turning PDFs into indexed records.
//!
//! This crate provides:
//! - PDF text extraction behind the [`TextExtractor`] trait
//! - Document classification and field extraction through a [`TextGenerator`](docflow_llm::TextGenerator)
//! - The batch pipeline that converts `pdf_documents/*.pdf` into JSON records
//! - The indexer that embeds JSON records into the document store

mod classifier;
mod error;
mod extractor;
mod indexer;
mod parsers;
mod pipeline;

#[cfg(test)]
mod testing;

pub use classifier::{classification_prompt, Classifier};
pub use error::{IngestError, IngestResult};
pub use extractor::{extraction_prompt, locate_json, FieldExtractor};
pub use indexer::{IndexFileReport, IndexOutcome, IndexReport, Indexer};
pub use parsers::{clean_pdf_text, PdfTextExtractor, TextExtractor};
pub use pipeline::{BatchPipeline, ExtractionReport, FileOutcome, FileReport};
