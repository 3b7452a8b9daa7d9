//! Named collections of embedded documents.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, ErrorCode, OptionalExtension};
use tracing::debug;

/// An entry to insert into a collection.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub id: String,
    pub document: String,
    pub embedding: Vec<f32>,
    pub metadata: serde_json::Value,
    pub document_type: String,
}

/// An entry as read back from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub id: String,
    pub document: String,
    pub embedding: Vec<f32>,
    pub metadata: serde_json::Value,
    pub document_type: String,
    pub created_at: DateTime<Utc>,
}

/// Handle to one named collection.
#[derive(Clone)]
pub struct Collection {
    db: Database,
    name: String,
}

impl Database {
    /// Get a collection, creating it when it does not exist yet.
    pub fn get_or_create_collection(&self, name: &str) -> DbResult<Collection> {
        let conn = self.conn()?;
        let created = conn.execute(
            "INSERT OR IGNORE INTO collections (name, created_at) VALUES (?1, ?2)",
            params![name, Utc::now().to_rfc3339()],
        )?;
        if created > 0 {
            debug!("Created collection '{}'", name);
        }

        Ok(Collection {
            db: self.clone(),
            name: name.to_string(),
        })
    }

    /// Get an existing collection.
    pub fn get_collection(&self, name: &str) -> DbResult<Collection> {
        let conn = self.conn()?;
        let exists: Option<String> = conn
            .query_row(
                "SELECT name FROM collections WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        match exists {
            Some(_) => Ok(Collection {
                db: self.clone(),
                name: name.to_string(),
            }),
            None => Err(DbError::NotFound(format!("Collection not found: {}", name))),
        }
    }

    /// Names of all collections, alphabetically.
    pub fn list_collections(&self) -> DbResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT name FROM collections ORDER BY name")?;
        let names = stmt.query_map([], |row| row.get(0))?;
        names.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether an entry with this identifier is already stored.
    pub fn contains(&self, id: &str) -> DbResult<bool> {
        let conn = self.db.conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM entries WHERE collection = ?1 AND id = ?2",
                params![self.name, id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Insert a new entry. Existing identifiers are never overwritten.
    pub fn add(&self, entry: &NewEntry) -> DbResult<()> {
        let conn = self.db.conn()?;

        let result = conn.execute(
            r#"
            INSERT INTO entries (collection, id, document, embedding, dimensions, metadata, document_type, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                self.name,
                entry.id,
                entry.document,
                encode_vector(&entry.embedding),
                entry.embedding.len() as i64,
                entry.metadata.to_string(),
                entry.document_type,
                Utc::now().to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => {
                debug!("Added '{}' to collection '{}'", entry.id, self.name);
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(DbError::AlreadyExists {
                    collection: self.name.clone(),
                    id: entry.id.clone(),
                })
            }
            Err(e) => Err(DbError::from(e)),
        }
    }

    /// Every entry of the collection, in insertion order.
    pub fn get_all(&self) -> DbResult<Vec<StoredEntry>> {
        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, document, embedding, dimensions, metadata, document_type, created_at
            FROM entries WHERE collection = ?1 ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map(params![self.name], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Vec<u8>>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, document, bytes, dimensions, metadata, document_type, created_at) = row?;
            let embedding = decode_vector(&bytes, dimensions)
                .ok_or_else(|| DbError::Corrupt(format!("embedding of '{}' is truncated", id)))?;

            entries.push(StoredEntry {
                id,
                document,
                embedding,
                metadata: serde_json::from_str(&metadata)?,
                document_type,
                created_at: DateTime::parse_from_rfc3339(&created_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            });
        }

        Ok(entries)
    }

    /// Number of entries in the collection.
    pub fn count(&self) -> DbResult<usize> {
        let conn = self.db.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE collection = ?1",
            params![self.name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn decode_vector(bytes: &[u8], dimensions: i64) -> Option<Vec<f32>> {
    let dimensions = usize::try_from(dimensions).ok()?;
    if bytes.len() != dimensions * 4 {
        return None;
    }

    Some(
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(id: &str) -> NewEntry {
        NewEntry {
            id: id.to_string(),
            document: format!("Summary of {}", id),
            embedding: vec![0.1, 0.2, 0.3, 0.4],
            metadata: json!({ "json_data": "{}", "document_type": "invoice" }),
            document_type: "invoice".to_string(),
        }
    }

    #[test]
    fn test_add_and_get_all() {
        let db = Database::open_in_memory().unwrap();
        let invoices = db.get_or_create_collection("invoices").unwrap();

        invoices.add(&entry("doc2")).unwrap();
        invoices.add(&entry("doc1")).unwrap();

        let all = invoices.get_all().unwrap();
        assert_eq!(all.len(), 2);
        // Insertion order, not key order
        assert_eq!(all[0].id, "doc2");
        assert_eq!(all[1].id, "doc1");
        assert_eq!(all[1].document, "Summary of doc1");
        assert_eq!(all[0].metadata["document_type"], "invoice");
        assert_eq!(all[0].embedding.len(), 4);
        assert!((all[0].embedding[2] - 0.3).abs() < 0.0001);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let invoices = db.get_or_create_collection("invoices").unwrap();

        invoices.add(&entry("doc1")).unwrap();
        let mut changed = entry("doc1");
        changed.document = "Overwritten".to_string();

        let result = invoices.add(&changed);
        assert!(matches!(result, Err(DbError::AlreadyExists { .. })));
        assert_eq!(invoices.count().unwrap(), 1);
        assert_eq!(invoices.get_all().unwrap()[0].document, "Summary of doc1");
    }

    #[test]
    fn test_collections_are_independent() {
        let db = Database::open_in_memory().unwrap();
        let invoices = db.get_or_create_collection("invoices").unwrap();
        let contracts = db.get_or_create_collection("contracts").unwrap();

        invoices.add(&entry("doc1")).unwrap();
        contracts.add(&entry("doc1")).unwrap();

        assert!(invoices.contains("doc1").unwrap());
        assert!(!invoices.contains("doc9").unwrap());
        assert_eq!(invoices.count().unwrap(), 1);
        assert_eq!(contracts.count().unwrap(), 1);
        assert_eq!(
            db.list_collections().unwrap(),
            vec!["contracts".to_string(), "invoices".to_string()]
        );
    }

    #[test]
    fn test_get_collection_requires_existing() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(db.get_collection("invoices"), Err(DbError::NotFound(_))));

        db.get_or_create_collection("invoices").unwrap();
        let again = db.get_or_create_collection("invoices").unwrap();
        assert_eq!(again.name(), "invoices");
        assert!(db.get_collection("invoices").is_ok());
    }

    #[test]
    fn test_decode_vector_rejects_truncated_blob() {
        let bytes = encode_vector(&[1.0, 2.0]);
        assert_eq!(decode_vector(&bytes, 2), Some(vec![1.0, 2.0]));
        assert_eq!(decode_vector(&bytes[..5], 2), None);
    }
}
