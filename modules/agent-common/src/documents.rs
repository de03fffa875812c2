//! Document storage: JSON objects addressed by `(collection, id)`.

use crate::error::AgentError;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::sync::{Mutex, MutexGuard};

pub type Document = Map<String, Value>;

const STAGE: &str = "document_store";

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write `data` to the document. With `merge` the fields are merged into
    /// any existing document, otherwise the document is replaced.
    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Document,
        merge: bool,
    ) -> Result<(), AgentError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AgentError>;
}

/// Merge `patch` into `target`. Nested objects merge key by key; any other
/// value replaces what was there.
pub fn merge_fields(target: &mut Document, patch: Document) {
    for (key, value) in patch {
        match value {
            Value::Object(incoming) => match target.get_mut(&key) {
                Some(Value::Object(existing)) => merge_fields(existing, incoming),
                _ => {
                    target.insert(key, Value::Object(incoming));
                }
            },
            other => {
                target.insert(key, other);
            }
        }
    }
}

/// SQLite-backed document store.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    pub fn open(path: &str) -> rusqlite::Result<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                doc_id TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (collection, doc_id)
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, AgentError> {
        self.conn
            .lock()
            .map_err(|_| AgentError::upstream(STAGE, "connection lock poisoned"))
    }
}

fn read_document(
    conn: &Connection,
    collection: &str,
    id: &str,
) -> Result<Option<Document>, AgentError> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2",
            rusqlite::params![collection, id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| AgentError::upstream(STAGE, format!("read failed: {}", e)))?;

    match body {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| AgentError::decode(STAGE, format!("{}/{}: {}", collection, id, e))),
        None => Ok(None),
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Document,
        merge: bool,
    ) -> Result<(), AgentError> {
        let conn = self.lock()?;

        let document = if merge {
            let mut existing = read_document(&conn, collection, id)?.unwrap_or_default();
            merge_fields(&mut existing, data);
            existing
        } else {
            data
        };

        let body = serde_json::to_string(&document)
            .map_err(|e| AgentError::decode(STAGE, e.to_string()))?;
        conn.execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3)
             ON CONFLICT(collection, doc_id) DO UPDATE SET
                body = excluded.body,
                updated_at = datetime('now')",
            rusqlite::params![collection, id, body],
        )
        .map_err(|e| AgentError::upstream(STAGE, format!("write failed: {}", e)))?;

        log::debug!("Stored {}/{} (merge={})", collection, id, merge);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AgentError> {
        let conn = self.lock()?;
        read_document(&conn, collection, id)
    }
}
