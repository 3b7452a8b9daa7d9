//! Core domain types for Docflow.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stable key of a document, derived from its source file name.
pub type DocumentId = String;

/// Derive a document identifier from a file path (the file stem).
pub fn document_id(path: &Path) -> Option<DocumentId> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Kind of business document handled by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Invoice,
    Contract,
}

impl DocumentType {
    /// Every supported document type, in processing order.
    pub const ALL: [DocumentType; 2] = [DocumentType::Invoice, DocumentType::Contract];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Contract => "contract",
        }
    }

    /// Name of the vector collection holding this type.
    pub fn collection_name(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoices",
            DocumentType::Contract => "contracts",
        }
    }

    /// Bracketed tag used when the document is handed to the answer model.
    pub fn context_tag(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "SĄSKAITA FAKTŪRA",
            DocumentType::Contract => "SUTARTIS",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Label produced by the document classifier.
///
/// `Unknown` means "cannot process": callers skip the file and keep it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Invoice,
    Contract,
    Unknown,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Invoice => "invoice",
            Classification::Contract => "contract",
            Classification::Unknown => "unknown",
        }
    }

    /// Normalize a raw model reply: trimmed, lower-cased, and anything other
    /// than the two known labels collapses to `Unknown`.
    pub fn from_reply(reply: &str) -> Self {
        match reply.trim().to_lowercase().as_str() {
            "invoice" => Classification::Invoice,
            "contract" => Classification::Contract,
            _ => Classification::Unknown,
        }
    }

    pub fn document_type(&self) -> Option<DocumentType> {
        match self {
            Classification::Invoice => Some(DocumentType::Invoice),
            Classification::Contract => Some(DocumentType::Contract),
            Classification::Unknown => None,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_closure() {
        let replies = [
            "invoice",
            "  Contract \n",
            "INVOICE",
            "unknown",
            "sąskaita faktūra",
            "'invoice'",
            "",
            "The document is an invoice.",
        ];

        for reply in replies {
            let label = Classification::from_reply(reply).as_str();
            assert!(["invoice", "contract", "unknown"].contains(&label));
        }

        assert_eq!(Classification::from_reply(" INVOICE\n"), Classification::Invoice);
        assert_eq!(Classification::from_reply("contract"), Classification::Contract);
        assert_eq!(Classification::from_reply("'invoice'"), Classification::Unknown);
    }

    #[test]
    fn test_document_type_names() {
        assert_eq!(DocumentType::Invoice.collection_name(), "invoices");
        assert_eq!(DocumentType::Contract.collection_name(), "contracts");
        assert_eq!(DocumentType::Contract.context_tag(), "SUTARTIS");
        assert_eq!(Classification::Contract.document_type(), Some(DocumentType::Contract));
        assert_eq!(Classification::Unknown.document_type(), None);
    }

    #[test]
    fn test_document_id_from_path() {
        assert_eq!(document_id(Path::new("invoices/doc1.json")), Some("doc1".to_string()));
        assert_eq!(document_id(Path::new("pdf_documents/a.b.pdf")), Some("a.b".to_string()));
        assert_eq!(document_id(Path::new("/")), None);
    }
}
