//! Docflow Core - Core types and record schema for the Docflow document pipeline.

mod error;
mod record;
mod summary;
mod types;

pub use error::{Error, Result};
pub use record::*;
pub use summary::{contract_summary, invoice_summary, summarize};
pub use types::*;
