//! Remote analysis errors.
//!
//! Every variant maps onto a fixed wire code so hosts can render their own
//! message table without parsing display strings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("API token not configured: {0}")]
    TokenMissing(String),

    #[error("Invalid analysis configuration: {0}")]
    ConfigInvalid(String),

    #[error("API token rejected: {0}")]
    Unauthorized(String),

    #[error("Quota exhausted or rate limited: {0}")]
    Quota(String),

    #[error("Model call timed out after {0} ms")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Response schema invalid: {0}")]
    SchemaInvalid(String),

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),
}

impl AnalysisError {
    /// Wire code of this failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TokenMissing(_) => "TOKEN_MISSING",
            Self::ConfigInvalid(_) => "CONFIG_INVALID",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Quota(_) => "QUOTA",
            Self::Timeout(_) => "TIMEOUT",
            Self::Network(_) => "NETWORK",
            Self::SchemaInvalid(_) => "SCHEMA_INVALID",
            Self::InvalidResponse(_) => "INVALID_RESPONSE",
        }
    }

    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(AnalysisError::TokenMissing(String::new()).code(), "TOKEN_MISSING");
        assert_eq!(AnalysisError::ConfigInvalid(String::new()).code(), "CONFIG_INVALID");
        assert_eq!(AnalysisError::Unauthorized(String::new()).code(), "UNAUTHORIZED");
        assert_eq!(AnalysisError::Quota(String::new()).code(), "QUOTA");
        assert_eq!(AnalysisError::Timeout(20_000).code(), "TIMEOUT");
        assert_eq!(AnalysisError::Network(String::new()).code(), "NETWORK");
        assert_eq!(AnalysisError::SchemaInvalid(String::new()).code(), "SCHEMA_INVALID");
        assert_eq!(AnalysisError::InvalidResponse(String::new()).code(), "INVALID_RESPONSE");
    }

    #[test]
    fn test_timeout_display() {
        let err = AnalysisError::Timeout(20_000);
        assert!(err.to_string().contains("20000"));
    }

    #[test]
    fn test_retryable() {
        assert!(AnalysisError::Network("reset".to_string()).is_retryable());
        assert!(AnalysisError::Timeout(1).is_retryable());
        assert!(!AnalysisError::Quota("429".to_string()).is_retryable());
        assert!(!AnalysisError::SchemaInvalid("x".to_string()).is_retryable());
    }
}
