//! Docflow Server - answers questions over every stored document.
//!
//! `POST /ask` gathers the full contents of the `invoices` and `contracts`
//! collections, hands them to the local model as context and returns its
//! answer. `GET /` serves a small question form and `GET /health` reports
//! collection sizes and model reachability.

mod api;
mod query;

pub use api::{create_router, serve, AppState};
pub use query::{
    QueryError, QueryService, MISSING_QUERY_MESSAGE, NO_ANSWER_MESSAGE, NO_DOCUMENTS_MESSAGE,
    UNAVAILABLE_MESSAGE,
};
