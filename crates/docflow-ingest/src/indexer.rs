//! Embedding JSON records into the document store.

use crate::error::{IngestError, IngestResult};
use docflow_config::PathsConfig;
use docflow_core::{document_id, summarize, DocumentRecord, DocumentType};
use docflow_db::{Collection, Database, NewEntry};
use docflow_llm::Embedder;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Terminal state of one JSON record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// Embedded and stored; the JSON file was consumed.
    Indexed { id: String },
    /// The identifier is already in the collection; the file is kept.
    AlreadyIndexed { id: String },
    /// Something failed; the file is kept for the next run.
    Failed { reason: String },
}

/// Outcome of one file, reported as soon as it is known.
#[derive(Debug, Clone)]
pub struct IndexFileReport {
    pub file: PathBuf,
    pub doc_type: DocumentType,
    pub outcome: IndexOutcome,
}

/// Summary of an indexing run.
#[derive(Debug, Clone, Default)]
pub struct IndexReport {
    pub files: Vec<IndexFileReport>,
    pub invoice_count: usize,
    pub contract_count: usize,
}

impl IndexReport {
    pub fn indexed(&self) -> usize {
        self.count(|o| matches!(o, IndexOutcome::Indexed { .. }))
    }

    pub fn already_indexed(&self) -> usize {
        self.count(|o| matches!(o, IndexOutcome::AlreadyIndexed { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, IndexOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&IndexOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }
}

/// Summarizes, embeds and stores the records of both output directories.
pub struct Indexer {
    db: Database,
    embedder: Arc<dyn Embedder>,
    paths: PathsConfig,
}

impl Indexer {
    pub fn new(db: Database, embedder: Arc<dyn Embedder>, paths: PathsConfig) -> Self {
        Self { db, embedder, paths }
    }

    fn source_dir(&self, doc_type: DocumentType) -> &Path {
        match doc_type {
            DocumentType::Invoice => &self.paths.invoices_dir,
            DocumentType::Contract => &self.paths.contracts_dir,
        }
    }

    /// JSON records waiting in the directory of one type, sorted by file name.
    pub fn pending_files(&self, doc_type: DocumentType) -> IngestResult<Vec<PathBuf>> {
        let dir = self.source_dir(doc_type);
        if !dir.exists() {
            warn!("Directory {} not found, skipping {}s", dir.display(), doc_type);
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry?;
            let is_json = entry
                .path()
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false);
            if entry.file_type().is_file() && is_json {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Records of every type, invoices first.
    pub fn all_pending(&self) -> IngestResult<Vec<(DocumentType, PathBuf)>> {
        let mut all = Vec::new();
        for doc_type in DocumentType::ALL {
            all.extend(self.pending_files(doc_type)?.into_iter().map(|f| (doc_type, f)));
        }
        Ok(all)
    }

    /// Index every pending record.
    pub async fn run<F>(&self, on_file: F) -> IngestResult<IndexReport>
    where
        F: FnMut(&IndexFileReport),
    {
        let files = self.all_pending()?;
        self.process_files(&files, on_file).await
    }

    /// Index the given records one at a time.
    pub async fn process_files<F>(
        &self,
        files: &[(DocumentType, PathBuf)],
        mut on_file: F,
    ) -> IngestResult<IndexReport>
    where
        F: FnMut(&IndexFileReport),
    {
        let invoices = self.db.get_or_create_collection(DocumentType::Invoice.collection_name())?;
        let contracts = self.db.get_or_create_collection(DocumentType::Contract.collection_name())?;

        let mut report = IndexReport::default();
        for (doc_type, file) in files {
            let collection = match doc_type {
                DocumentType::Invoice => &invoices,
                DocumentType::Contract => &contracts,
            };

            let outcome = match self.index_file(collection, *doc_type, file).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Failed to index {}: {}", file.display(), e);
                    IndexOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            let file_report = IndexFileReport {
                file: file.clone(),
                doc_type: *doc_type,
                outcome,
            };
            on_file(&file_report);
            report.files.push(file_report);
        }

        report.invoice_count = invoices.count()?;
        report.contract_count = contracts.count()?;

        info!(
            "Indexing finished: {} indexed, {} already present, {} failed",
            report.indexed(),
            report.already_indexed(),
            report.failed()
        );
        Ok(report)
    }

    /// Index one record into `collection`.
    pub async fn index_file(
        &self,
        collection: &Collection,
        doc_type: DocumentType,
        path: &Path,
    ) -> IngestResult<IndexOutcome> {
        let id = document_id(path).ok_or_else(|| IngestError::InvalidFileName(path.to_path_buf()))?;

        if collection.contains(&id)? {
            info!("{} ({}) is already indexed, skipping", id, doc_type);
            return Ok(IndexOutcome::AlreadyIndexed { id });
        }

        let contents = std::fs::read_to_string(path)?;
        let record = DocumentRecord::from_json_str(doc_type, &contents)?;

        let summary = summarize(&record);
        debug!("Summary of {} has {} chars", id, summary.chars().count());

        let embedding = self.embedder.embed_text(&summary).await?;
        debug!("Embedding of {} has {} dimensions", id, embedding.len());

        collection.add(&NewEntry {
            id: id.clone(),
            document: summary,
            embedding,
            metadata: json!({
                "json_data": record.to_compact_json()?,
                "document_type": doc_type.as_str(),
            }),
            document_type: doc_type.as_str().to_string(),
        })?;
        info!("Indexed {} into '{}'", id, collection.name());

        if let Err(e) = std::fs::remove_file(path) {
            warn!("Indexed {} but could not remove {}: {}", id, path.display(), e);
        }

        Ok(IndexOutcome::Indexed { id })
    }
}
