//! Storage collaborator errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage query failed: {0}")]
    Query(String),

    #[error("Stored value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_unavailable() {
        let err = StorageError::Unavailable("disk full".to_string());
        assert!(err.to_string().contains("unavailable"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_storage_error_query() {
        let err = StorageError::Query("no such table".to_string());
        assert!(err.to_string().contains("query failed"));
    }

    #[test]
    fn test_storage_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = StorageError::from(json_err);
        assert!(err.to_string().contains("not valid JSON"));
    }
}
