//! Error types for the ingestion pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur during ingestion.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] docflow_db::DbError),

    #[error("Config error: {0}")]
    Config(#[from] docflow_config::ConfigError),

    #[error("Model error: {0}")]
    Model(#[from] docflow_llm::LlmError),

    #[error("Record error: {0}")]
    Record(#[from] docflow_core::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Parse error for {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Model output is not valid JSON: {0}")]
    MalformedOutput(String),

    #[error("Record {0} already exists")]
    OutputExists(PathBuf),

    #[error("Cannot derive a document id from {0}")]
    InvalidFileName(PathBuf),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}
