//! Database connection and pool management.

use crate::error::{DbError, DbResult};
use crate::migrations;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::{Path, PathBuf};
use tracing::info;

/// Name of the SQLite file inside the store directory.
pub const DATABASE_FILE: &str = "documents.db";

/// Type alias for connection pool.
pub type ConnectionPool = Pool<SqliteConnectionManager>;
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Main database handle.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    /// Open (or create) the store kept in `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> DbResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| DbError::Other(e.to_string()))?;

        let path = Self::file_path(dir);
        info!("Opening document store at: {}", path.display());

        let manager = SqliteConnectionManager::file(&path).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;",
            )?;
            Ok(())
        });

        let pool = Pool::builder().max_size(4).build(manager)?;

        {
            let conn = pool.get()?;
            migrations::initialize_schema(&conn)?;
        }

        Ok(Self { pool })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(1) // Memory DB only supports single connection
            .build(manager)?;

        {
            let conn = pool.get()?;
            migrations::initialize_schema(&conn)?;
        }

        Ok(Self { pool })
    }

    /// Location of the SQLite file for a store directory.
    pub fn file_path<P: AsRef<Path>>(dir: P) -> PathBuf {
        dir.as_ref().join(DATABASE_FILE)
    }

    /// Get a connection from the pool.
    pub fn conn(&self) -> DbResult<PooledConn> {
        self.pool.get().map_err(DbError::from)
    }

    /// Get database file size in bytes.
    pub fn file_size<P: AsRef<Path>>(path: P) -> DbResult<u64> {
        let metadata = std::fs::metadata(path).map_err(|e| DbError::Other(e.to_string()))?;
        Ok(metadata.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_open_creates_store_directory() {
        let temp = TempDir::new().unwrap();
        let store = temp.path().join("my_documents_db");

        let db = Database::open(&store).unwrap();
        db.get_or_create_collection("invoices").unwrap();

        assert!(store.join(DATABASE_FILE).exists());
        assert!(Database::file_size(Database::file_path(&store)).unwrap() > 0);
    }

    #[test]
    fn test_reopen_keeps_collections() {
        let temp = TempDir::new().unwrap();

        {
            let db = Database::open(temp.path()).unwrap();
            db.get_or_create_collection("contracts").unwrap();
        }

        let db = Database::open(temp.path()).unwrap();
        assert_eq!(db.list_collections().unwrap(), vec!["contracts".to_string()]);
    }
}
