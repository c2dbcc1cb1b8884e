use rusqlite::{Connection, OpenFlags, params};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::{Result, StoreError};
use super::{ExportRepository, StoreRecord};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    body TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents (collection);
";

/// Read-only handle on an unpacked export data store
///
/// The underlying connection is released when the handle is dropped.
#[derive(Debug)]
pub struct ExportDb {
    conn: Connection,
    path: PathBuf,
}

impl ExportDb {
    /// Open an existing store and check that it carries the document schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        // First real read; a file that is not SQLite fails here.
        let tables: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'documents'",
            [],
            |row| row.get(0),
        )?;
        if tables == 0 {
            return Err(StoreError::MissingSchema(path.to_path_buf()));
        }

        debug!(path = %path.display(), "Opened export data store");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Close the connection, surfacing any error SQLite reports on close
    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn.close().map_err(|(_, err)| StoreError::Sqlite(err))?;
        debug!(path = %path.display(), "Closed export data store");
        Ok(())
    }
}

impl ExportRepository for ExportDb {
    fn count(&self, collection: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn documents(&self, collection: &str) -> Result<Vec<Value>> {
        let mut stmt = self
            .conn
            .prepare("SELECT body FROM documents WHERE collection = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![collection], |row| row.get::<_, String>(0))?;

        let mut documents = Vec::new();
        for row in rows {
            let body = row?;
            let document = serde_json::from_str(&body).map_err(|source| StoreError::Decode {
                collection: collection.to_string(),
                source,
            })?;
            documents.push(document);
        }
        Ok(documents)
    }
}

/// Builds a new export data store file
///
/// Used by the export side to produce packages.
pub struct ExportDbWriter {
    conn: Connection,
}

impl ExportDbWriter {
    /// Create (or extend) a store at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        info!(path = %path.display(), "Created export data store");
        Ok(Self { conn })
    }

    /// Append a document to `collection`
    pub fn insert<T: Serialize>(&self, collection: &str, document: &T) -> Result<()> {
        let body = serde_json::to_string(document).map_err(|source| StoreError::Encode {
            collection: collection.to_string(),
            source,
        })?;
        self.conn.execute(
            "INSERT INTO documents (collection, body) VALUES (?1, ?2)",
            params![collection, body],
        )?;
        Ok(())
    }

    /// Append a record to its well-known collection
    pub fn insert_record<T: StoreRecord + Serialize>(&self, record: &T) -> Result<()> {
        self.insert(T::COLLECTION, record)
    }

    /// Flush and close the file
    pub fn finish(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| StoreError::Sqlite(err))
    }
}
