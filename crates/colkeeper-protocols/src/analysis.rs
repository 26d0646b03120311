//! Remote analysis protocol.
//!
//! The analyzer receives a reduced page snapshot and answers with raw JSON.
//! Callers never trust that JSON: [`Analysis::from_value`] validates the
//! array shapes before anything is used.

use std::sync::LazyLock;

use async_trait::async_trait;
use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::AnalysisError;

/// Version stamped on analyses produced by this crate family.
pub const ANALYSIS_SCHEMA_VERSION: &str = "1.0";

/// Core trait for remote page analyzers.
#[async_trait]
pub trait PageAnalyzer: Send + Sync {
    /// Returns the analyzer ID.
    fn id(&self) -> &str;

    /// Analyze a page snapshot.
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReply, AnalysisError>;
}

/// Input of one analysis call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub snapshot: PageSnapshot,
    /// Full page URL; the analyzer strips query and fragment for caching.
    pub url: String,
    /// Storage key of the view the request is made for.
    pub view_key: String,
    /// Skip any cached analysis.
    #[serde(default)]
    pub force_refresh: bool,
}

/// Where an analysis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Cache,
    Model,
}

/// Raw analyzer answer; validate with [`Analysis::from_value`].
#[derive(Debug, Clone)]
pub struct AnalysisReply {
    pub source: AnalysisSource,
    pub payload: Value,
}

/// Storage key of a cached analysis: the URL without query or fragment,
/// plus the view key (`default-view` when empty).
pub fn analysis_cache_key(url: &str, view_key: &str) -> String {
    let base = url.split(['?', '#']).next().unwrap_or_default();
    let view = if view_key.is_empty() { "default-view" } else { view_key };
    format!("analysis_cache:{}:{}", base, view)
}

// ============================================================================
// Snapshot
// ============================================================================

/// Reduced page snapshot sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub page: PageInfo,
    pub dom_summary: Vec<DomSummaryNode>,
    pub table_metadata: Vec<TableMetadata>,
    pub policy: AnalysisPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    pub origin: String,
    pub pathname: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomSummaryNode {
    pub tag: String,
    pub id: Option<String>,
    #[serde(rename = "className")]
    pub class_name: String,
    pub role: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMetadata {
    pub table_id: String,
    pub tag: String,
    pub column_count: usize,
    pub columns: Vec<ColumnMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub field: Option<String>,
    pub header: Option<String>,
    pub visible: bool,
    pub inferred_type: String,
}

/// What the model is allowed to propose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisPolicy {
    pub allowed_actions: Vec<String>,
    pub max_suggestions: usize,
}

// ============================================================================
// Analysis
// ============================================================================

/// Validated model analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub detected_components: Vec<DetectedComponent>,
    pub recommended_actions: Vec<RecommendedAction>,
    pub table_configs: Vec<TableConfig>,

    /// Envelope keys added by analyzers (`schema_version`, `generated_at`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendedAction {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub table_id: String,
    pub columns: Vec<SuggestedColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possible_actions: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestedColumn {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub suggested_visibility: Option<String>,
}

impl SuggestedColumn {
    pub fn should_hide(&self) -> bool {
        self.suggested_visibility.as_deref() == Some("hide")
    }
}

static ANALYSIS_VALIDATOR: LazyLock<Result<Validator, String>> = LazyLock::new(|| {
    jsonschema::validator_for(&analysis_schema()).map_err(|e| e.to_string())
});

/// JSON schema every analysis payload must satisfy.
pub fn analysis_schema() -> Value {
    json!({
        "type": "object",
        "required": ["detected_components", "recommended_actions", "table_configs"],
        "properties": {
            "detected_components": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["type"],
                    "properties": { "type": { "type": "string" } }
                }
            },
            "recommended_actions": {
                "type": "array",
                "items": { "type": "object" }
            },
            "table_configs": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["table_id", "columns"],
                    "properties": {
                        "table_id": { "type": "string" },
                        "columns": { "type": "array", "items": { "type": "object" } },
                        "possible_actions": { "type": ["array", "null"] }
                    }
                }
            }
        }
    })
}

impl Analysis {
    /// Validate and decode a raw payload.
    ///
    /// Any shape mismatch is a `SCHEMA_INVALID` failure; partial use of a
    /// malformed payload is never attempted.
    pub fn from_value(payload: Value) -> Result<Self, AnalysisError> {
        let validator = ANALYSIS_VALIDATOR
            .as_ref()
            .map_err(|e| AnalysisError::SchemaInvalid(format!("schema unavailable: {}", e)))?;

        if let Some(error) = validator.iter_errors(&payload).next() {
            let path = error.instance_path.to_string();
            let location = if path.is_empty() { "/".to_string() } else { path };
            return Err(AnalysisError::SchemaInvalid(format!("{} at {}", error, location)));
        }

        serde_json::from_value(payload).map_err(|e| AnalysisError::SchemaInvalid(e.to_string()))
    }

    /// Envelope string value, when present.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
#[path = "analysis_tests.rs"]
mod tests;
