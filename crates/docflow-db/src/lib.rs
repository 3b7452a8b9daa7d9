//! Docflow DB - named document collections stored in SQLite.

mod database;
mod error;
mod migrations;
mod operations;

pub use database::{Database, DATABASE_FILE};
pub use error::{DbError, DbResult};
pub use operations::collections::{Collection, NewEntry, StoredEntry};
