//! Answering questions from the stored documents.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docflow_core::DocumentType;
use docflow_db::{Collection, Database, DbResult};
use docflow_llm::{build_answer_prompt, build_context, ContextItem, LlmError, TextGenerator};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const NO_DOCUMENTS_MESSAGE: &str =
    "Atsiprašau, duomenų bazėje nerasta jokių dokumentų (sąskaitų ar sutarčių).";
pub const MISSING_QUERY_MESSAGE: &str = "Užklausa nerasta.";
pub const UNAVAILABLE_MESSAGE: &str =
    "Klaida: Nepavyko prisijungti prie vietinio LLM serverio. Ar veikia Ollama?";
pub const NO_ANSWER_MESSAGE: &str = "Klaida: Nepavyko gauti atsakymo iš vietinio LLM.";

/// Failure kinds of a question, each with its own status code.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("{}", MISSING_QUERY_MESSAGE)]
    MissingQuery,

    #[error("{}", UNAVAILABLE_MESSAGE)]
    ModelUnavailable,

    #[error("Ollama API klaida: {0}")]
    Upstream(String),

    #[error("Serverio klaida: {0}")]
    Internal(String),
}

impl QueryError {
    pub fn status(&self) -> StatusCode {
        match self {
            QueryError::MissingQuery => StatusCode::BAD_REQUEST,
            QueryError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            QueryError::Upstream(_) | QueryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LlmError> for QueryError {
    fn from(err: LlmError) -> Self {
        match err {
            e if e.is_unreachable() => QueryError::ModelUnavailable,
            e @ (LlmError::ParseError(_) | LlmError::Json(_)) => QueryError::Internal(e.to_string()),
            e => QueryError::Upstream(e.to_string()),
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Answers questions with every stored document as context.
pub struct QueryService {
    invoices: Collection,
    contracts: Collection,
    generator: Arc<dyn TextGenerator>,
}

impl QueryService {
    pub fn new(invoices: Collection, contracts: Collection, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            invoices,
            contracts,
            generator,
        }
    }

    /// Open both collections by name, creating them when missing.
    pub fn from_database(db: &Database, generator: Arc<dyn TextGenerator>) -> DbResult<Self> {
        let invoices = db.get_or_create_collection(DocumentType::Invoice.collection_name())?;
        let contracts = db.get_or_create_collection(DocumentType::Contract.collection_name())?;
        Ok(Self::new(invoices, contracts, generator))
    }

    /// Entry counts per collection. An unreadable collection counts as empty.
    pub fn counts(&self) -> (usize, usize) {
        let count = |collection: &Collection| {
            collection.count().unwrap_or_else(|e| {
                warn!("Could not count collection '{}': {}", collection.name(), e);
                0
            })
        };
        (count(&self.invoices), count(&self.contracts))
    }

    /// Every stored document, invoices first, tagged by type.
    pub fn context_items(&self) -> Vec<ContextItem> {
        read_context(&self.invoices, &self.contracts)
    }

    /// `context_items` on the blocking pool, keeping SQLite reads off the async workers.
    async fn load_context(&self) -> Result<Vec<ContextItem>, QueryError> {
        let invoices = self.invoices.clone();
        let contracts = self.contracts.clone();
        tokio::task::spawn_blocking(move || read_context(&invoices, &contracts))
            .await
            .map_err(|e| QueryError::Internal(e.to_string()))
    }

    /// Answer a question. The model reply is returned verbatim.
    pub async fn answer(&self, question: &str) -> Result<String, QueryError> {
        let items = self.load_context().await?;
        let Some(context) = build_context(&items) else {
            info!("No documents stored, answering without the model");
            return Ok(NO_DOCUMENTS_MESSAGE.to_string());
        };

        debug!("Answering with {} documents as context", items.len());
        let prompt = build_answer_prompt(&context, question);

        match self.generator.generate_text(&prompt).await {
            Ok(answer) => Ok(answer),
            Err(LlmError::EmptyResponse) => {
                warn!("Local model reply carried no answer");
                Ok(NO_ANSWER_MESSAGE.to_string())
            }
            Err(e) => {
                warn!("Local model request failed: {}", e);
                Err(e.into())
            }
        }
    }
}

fn read_context(invoices: &Collection, contracts: &Collection) -> Vec<ContextItem> {
    let mut items = Vec::new();
    for (doc_type, collection) in [(DocumentType::Invoice, invoices), (DocumentType::Contract, contracts)] {
        match collection.get_all() {
            Ok(entries) => items.extend(
                entries
                    .into_iter()
                    .map(|entry| ContextItem::new(doc_type.context_tag(), entry.document)),
            ),
            Err(e) => warn!("Could not read collection '{}': {}", collection.name(), e),
        }
    }
    items
}


#[cfg(test)]
mod tests {
    use super::testing::FixedGenerator;
    use super::*;
    use docflow_db::NewEntry;

    fn seeded_database() -> Database {
        let db = Database::open_in_memory().unwrap();
        let invoices = db.get_or_create_collection("invoices").unwrap();
        invoices
            .add(&NewEntry {
                id: "doc1".to_string(),
                document: "Sąskaita GR-1, suma 120.00 EUR".to_string(),
                embedding: vec![0.5, 1.0],
                metadata: json!({"json_data": "{}", "document_type": "invoice"}),
                document_type: "invoice".to_string(),
            })
            .unwrap();
        let contracts = db.get_or_create_collection("contracts").unwrap();
        contracts
            .add(&NewEntry {
                id: "sutartis".to_string(),
                document: "Nuomos sutartis, 1200 EUR per mėnesį".to_string(),
                embedding: vec![0.1, 0.2],
                metadata: json!({"json_data": "{}", "document_type": "contract"}),
                document_type: "contract".to_string(),
            })
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_empty_store_skips_model() {
        let db = Database::open_in_memory().unwrap();
        let generator = Arc::new(FixedGenerator::unreachable());
        let service = QueryService::from_database(&db, generator.clone()).unwrap();

        let answer = service.answer("test").await.unwrap();
        assert_eq!(answer, NO_DOCUMENTS_MESSAGE);
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_carries_every_document() {
        let db = seeded_database();
        let generator = Arc::new(FixedGenerator::answering(|| Ok("Suma yra 120 EUR.".to_string())));
        let service = QueryService::from_database(&db, generator.clone()).unwrap();

        let answer = service.answer("Kokia sąskaitos suma?").await.unwrap();
        assert_eq!(answer, "Suma yra 120 EUR.");

        let prompts = generator.prompts.lock().unwrap();
        let prompt = &prompts[0];
        let invoice = prompt.find("[SĄSKAITA FAKTŪRA]: Sąskaita GR-1").unwrap();
        let contract = prompt.find("[SUTARTIS]: Nuomos sutartis").unwrap();
        assert!(invoice < contract);
        assert!(prompt.contains("Kokia sąskaitos suma?"));
    }

    #[tokio::test]
    async fn test_empty_model_reply_has_fixed_answer() {
        let db = seeded_database();
        let generator = Arc::new(FixedGenerator::answering(|| Err(LlmError::EmptyResponse)));
        let service = QueryService::from_database(&db, generator).unwrap();

        assert_eq!(service.answer("?").await.unwrap(), NO_ANSWER_MESSAGE);
    }

    #[tokio::test]
    async fn test_failure_kinds() {
        let db = seeded_database();
        let service = QueryService::from_database(&db, Arc::new(FixedGenerator::unreachable())).unwrap();
        let err = service.answer("?").await.unwrap_err();
        assert!(matches!(err, QueryError::ModelUnavailable));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let generator = FixedGenerator::answering(|| {
            Err(LlmError::ApiError {
                status: 500,
                message: "boom".to_string(),
            })
        });
        let service = QueryService::from_database(&db, Arc::new(generator)).unwrap();
        let err = service.answer("?").await.unwrap_err();
        assert!(matches!(err, QueryError::Upstream(_)));
        assert!(err.to_string().starts_with("Ollama API klaida: "));

        let generator = FixedGenerator::answering(|| Err(LlmError::ParseError("bad body".to_string())));
        let service = QueryService::from_database(&db, Arc::new(generator)).unwrap();
        let err = service.answer("?").await.unwrap_err();
        assert!(matches!(err, QueryError::Internal(_)));
        assert!(err.to_string().starts_with("Serverio klaida: "));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_answers_read_the_store() {
        let db = seeded_database();
        let generator = Arc::new(FixedGenerator::answering(|| Ok("Gerai.".to_string())));
        let service = Arc::new(QueryService::from_database(&db, generator.clone()).unwrap());

        let (first, second) = tokio::join!(service.answer("Pirmas?"), service.answer("Antras?"));
        assert_eq!(first.unwrap(), "Gerai.");
        assert_eq!(second.unwrap(), "Gerai.");

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts.iter().all(|p| p.contains("[SUTARTIS]: Nuomos sutartis")));
    }

    #[test]
    fn test_context_items_order() {
        let db = seeded_database();
        let service = QueryService::from_database(&db, Arc::new(FixedGenerator::unreachable())).unwrap();
        let items = service.context_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].tag, DocumentType::Invoice.context_tag());
        assert_eq!(items[1].tag, DocumentType::Contract.context_tag());
    }

    #[test]
    fn test_counts() {
        let db = seeded_database();
        let service = QueryService::from_database(&db, Arc::new(FixedGenerator::unreachable())).unwrap();
        assert_eq!(service.counts(), (1, 1));
    }
}
