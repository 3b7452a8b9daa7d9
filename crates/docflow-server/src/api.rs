//! HTTP surface for the Query Service.
//!
//! - `GET /` – Question form.
//! - `POST /ask` – Answer `{"query": string}` with `{"response": string}`.
//! - `GET /health` – Collection sizes and whether the local model answers.

use crate::query::{QueryError, QueryService};
use axum::{
    body::Bytes,
    extract::State,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use docflow_llm::OllamaClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

const INDEX_PAGE: &str = include_str!("../static/index.html");

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QueryService>,
    /// Checked by `/health`; `None` reports the model as unavailable.
    pub ollama: Option<OllamaClient>,
}

impl AppState {
    pub fn new(service: Arc<QueryService>, ollama: Option<OllamaClient>) -> Self {
        Self { service, ollama }
    }
}

/// Build the HTTP router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/ask", post(ask))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(bind: &str, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!("Query service listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down query service");
}

async fn index_page() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    query: Option<String>,
}

#[derive(Serialize)]
struct AskResponse {
    response: String,
}

/// Answer a question. Any body without a usable `query` is a 400.
async fn ask(State(state): State<AppState>, body: Bytes) -> Result<Json<AskResponse>, QueryError> {
    let query = serde_json::from_slice::<AskRequest>(&body)
        .ok()
        .and_then(|request| request.query)
        .filter(|query| !query.trim().is_empty())
        .ok_or(QueryError::MissingQuery)?;

    info!("Question received ({} chars)", query.chars().count());
    let response = state.service.answer(&query).await?;
    Ok(Json(AskResponse { response }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    invoices: usize,
    contracts: usize,
    model_available: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (invoices, contracts) = state.service.counts();
    let model_available = match &state.ollama {
        Some(client) => client.is_available().await,
        None => false,
    };

    Json(HealthResponse {
        status: "ok",
        invoices,
        contracts,
        model_available,
    })
}
