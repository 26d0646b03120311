//! Content context errors.

use colkeeper_core::CoreError;
use colkeeper_protocols::{AnalysisError, StorageError};
use thiserror::Error;

use crate::messages;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("No table found on the page")]
    NoTables,

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid suggestion: {0}")]
    InvalidSuggestion(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl ContentError {
    /// Message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownAction(_) => messages::UNKNOWN_ACTION.to_string(),
            Self::NoTables => messages::NO_TABLES.to_string(),
            Self::InvalidSuggestion(_) => messages::INVALID_SUGGESTION.to_string(),
            Self::Analysis(e) => messages::analysis_failure(e).to_string(),
            other => messages::error(other),
        }
    }
}
