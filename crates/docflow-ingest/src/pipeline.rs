//! Batch conversion of PDF documents into JSON records.

use crate::classifier::Classifier;
use crate::error::{IngestError, IngestResult};
use crate::extractor::FieldExtractor;
use crate::parsers::TextExtractor;
use docflow_config::PathsConfig;
use docflow_core::{document_id, DocumentRecord, DocumentType};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Terminal state of one PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// JSON written to `output`, source PDF consumed.
    Stored {
        doc_type: DocumentType,
        output: PathBuf,
    },
    /// No text on the first page.
    SkippedEmpty,
    /// The classifier could not tell invoice from contract.
    SkippedUnclassified,
    /// No record could be extracted.
    FailedExtraction { reason: String },
    /// The record could not be written.
    FailedWrite { reason: String },
}

impl FileOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, FileOutcome::Stored { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, FileOutcome::SkippedEmpty | FileOutcome::SkippedUnclassified)
    }

    pub fn is_failed(&self) -> bool {
        matches!(
            self,
            FileOutcome::FailedExtraction { .. } | FileOutcome::FailedWrite { .. }
        )
    }
}

/// Outcome of one file, reported as soon as it is known.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub file: PathBuf,
    pub outcome: FileOutcome,
}

/// Summary of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    pub files: Vec<FileReport>,
}

impl ExtractionReport {
    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn stored(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_stored()).count()
    }

    pub fn stored_as(&self, doc_type: DocumentType) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Stored { doc_type: t, .. } if t == doc_type))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_failed()).count()
    }

    /// Every file was stored.
    pub fn is_clean(&self) -> bool {
        self.stored() == self.total()
    }
}

/// Classify, extract and store every PDF of the input directory.
pub struct BatchPipeline {
    text: Arc<dyn TextExtractor>,
    classifier: Classifier,
    fields: FieldExtractor,
    paths: PathsConfig,
}

impl BatchPipeline {
    pub fn new(
        text: Arc<dyn TextExtractor>,
        classifier: Classifier,
        fields: FieldExtractor,
        paths: PathsConfig,
    ) -> Self {
        Self {
            text,
            classifier,
            fields,
            paths,
        }
    }

    /// Create the input and output directories when missing.
    pub fn prepare_dirs(&self) -> IngestResult<()> {
        for dir in [
            &self.paths.invoices_dir,
            &self.paths.contracts_dir,
            &self.paths.pdf_dir,
        ] {
            if !dir.exists() {
                info!("Creating directory {}", dir.display());
                std::fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }

    /// Source documents waiting in the input directory, sorted by file name.
    pub fn pending_files(&self) -> IngestResult<Vec<PathBuf>> {
        if !self.paths.pdf_dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.paths.pdf_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let supported = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .map(|ext| self.text.supports(ext))
                .unwrap_or(false);
            if supported {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    fn output_dir(&self, doc_type: DocumentType) -> &Path {
        match doc_type {
            DocumentType::Invoice => &self.paths.invoices_dir,
            DocumentType::Contract => &self.paths.contracts_dir,
        }
    }

    /// Run the whole batch: prepare directories, then process every pending file.
    pub async fn run<F>(&self, on_file: F) -> IngestResult<ExtractionReport>
    where
        F: FnMut(&FileReport),
    {
        self.prepare_dirs()?;
        let files = self.pending_files()?;
        Ok(self.process_files(&files, on_file).await)
    }

    /// Process files one at a time, in the given order.
    pub async fn process_files<F>(&self, files: &[PathBuf], mut on_file: F) -> ExtractionReport
    where
        F: FnMut(&FileReport),
    {
        if files.is_empty() {
            info!("No PDF files found in {}", self.paths.pdf_dir.display());
        }

        let mut report = ExtractionReport::default();
        for file in files {
            let outcome = self.process_file(file).await;
            let file_report = FileReport {
                file: file.clone(),
                outcome,
            };
            on_file(&file_report);
            report.files.push(file_report);
        }

        info!(
            "Extraction finished: {} stored, {} skipped, {} failed",
            report.stored(),
            report.skipped(),
            report.failed()
        );
        report
    }

    /// Take one PDF through classification, extraction and storage.
    pub async fn process_file(&self, path: &Path) -> FileOutcome {
        let name = path.display();
        info!("Processing {}", name);

        let sample = match self.text.first_page(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Could not read text from {}: {}", name, e);
                String::new()
            }
        };
        if sample.trim().is_empty() {
            warn!("No text extracted from {}, skipping", name);
            return FileOutcome::SkippedEmpty;
        }

        let classification = self.classifier.classify(&sample).await;
        let Some(doc_type) = classification.document_type() else {
            warn!("Could not determine the document type of {}, keeping it", name);
            return FileOutcome::SkippedUnclassified;
        };
        info!("{} classified as {}", name, doc_type);

        let full_text = match self.text.full_text(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Could not read full text of {}: {}", name, e);
                return FileOutcome::FailedExtraction {
                    reason: e.to_string(),
                };
            }
        };

        let record = match self.fields.try_extract(&full_text, doc_type).await {
            Ok(record) => record,
            Err(e) => {
                warn!("No structured data extracted from {}, keeping it: {}", name, e);
                return FileOutcome::FailedExtraction {
                    reason: e.to_string(),
                };
            }
        };

        let output = match self.store_record(path, &record) {
            Ok(output) => output,
            Err(e) => {
                warn!("Could not write the record of {}: {}", name, e);
                return FileOutcome::FailedWrite {
                    reason: e.to_string(),
                };
            }
        };
        info!("Wrote {}", output.display());

        // The record is durable at this point; a failed delete only leaves a duplicate behind.
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Record stored but {} could not be removed: {}", name, e);
        } else {
            debug!("Removed {}", name);
        }

        FileOutcome::Stored { doc_type, output }
    }

    fn store_record(&self, source: &Path, record: &DocumentRecord) -> IngestResult<PathBuf> {
        let id = document_id(source).ok_or_else(|| IngestError::InvalidFileName(source.to_path_buf()))?;
        let dir = self.output_dir(record.document_type());
        std::fs::create_dir_all(dir)?;

        let target = dir.join(format!("{}.json", id));
        write_atomically(&target, record.to_pretty_json()?.as_bytes())?;
        Ok(target)
    }
}

/// Write to a temporary file beside `target`, sync it, then move it into place.
///
/// An existing `target` is never replaced: it may be a record from an earlier
/// run that is not indexed yet, or the output of a same-named PDF.
fn write_atomically(target: &Path, contents: &[u8]) -> IngestResult<()> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist_noclobber(target).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            IngestError::OutputExists(target.to_path_buf())
        } else {
            IngestError::Io(e.error)
        }
    })?;
    Ok(())
}
