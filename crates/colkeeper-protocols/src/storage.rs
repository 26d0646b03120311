//! Storage collaborator protocol.
//!
//! A flat, string-keyed namespace of JSON values. Absence of a key is the
//! normal "nothing saved" state and is reported as `Ok(None)`.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageError;

/// Asynchronous key-value store used for saved views, analysis caches and
/// suggestion decisions.
#[async_trait]
pub trait ViewStore: Send + Sync {
    /// Returns the backend ID.
    fn id(&self) -> &str;

    /// Read a value.
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
