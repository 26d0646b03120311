//! SQLite key-value store implementation.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{OptionalExtension, params};
use serde_json::Value;
use tokio_rusqlite::Connection;
use tracing::debug;

use colkeeper_protocols::{StorageError, ViewStore};

use crate::schema::init_schema;

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

/// SQLite-backed [`ViewStore`].
pub struct SqliteViewStore {
    conn: Connection,
}

impl SqliteViewStore {
    /// Create a new in-memory database.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Self::init(conn).await
    }

    /// Open or create a file-backed database, creating parent directories.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        }
        debug!(path = %path.display(), "Opening view store");
        let conn = Connection::open(path)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Stored keys starting with `prefix`, sorted.
    pub async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT key FROM kv_store WHERE key LIKE ?1 ESCAPE '\\' ORDER BY key",
                )?;
                let keys = stmt
                    .query_map([&pattern], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(|e| StorageError::Query(e.to_string()))
    }
}

#[async_trait]
impl ViewStore for SqliteViewStore {
    fn id(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let key = key.to_string();
        let raw: Option<String> = self
            .conn
            .call(move |conn| {
                let value = conn
                    .query_row("SELECT value FROM kv_store WHERE key = ?1", [&key], |row| {
                        row.get(0)
                    })
                    .optional()?;
                Ok(value)
            })
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let key = key.to_string();
        let text = serde_json::to_string(&value)?;
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                    params![key, text, now],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| StorageError::Query(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM kv_store WHERE key = ?1", [&key])?;
                Ok(())
            })
            .await
            .map_err(|e| StorageError::Query(e.to_string()))
    }
}
