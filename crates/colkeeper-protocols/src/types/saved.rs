//! Persisted view preferences.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_visible() -> bool {
    true
}

/// One entry of a current-format saved view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedColumn {
    pub field: String,

    #[serde(default = "default_visible")]
    pub visible: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SavedColumn {
    pub fn new(field: impl Into<String>, visible: bool) -> Self {
        Self {
            field: field.into(),
            visible,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A saved column preference list, in either historical encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SavedViewConfig {
    /// Bare field names: every listed field visible, in list order.
    Legacy(Vec<String>),
    /// `{field, visible, label}` entries.
    Current(Vec<SavedColumn>),
}

impl SavedViewConfig {
    /// Decode a stored value.
    ///
    /// The encoding is decided by the first element, as older writers never
    /// mixed the two. Entries that do not fit the chosen encoding are skipped.
    /// Returns `None` for anything that is not a non-empty array.
    pub fn from_value(value: &Value) -> Option<Self> {
        let items = value.as_array()?;
        let config = match items.first()? {
            Value::String(_) => Self::Legacy(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            ),
            Value::Object(_) => Self::Current(
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value::<SavedColumn>(item.clone()).ok())
                    .collect(),
            ),
            _ => return None,
        };
        (!config.is_empty()).then_some(config)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Legacy(fields) => fields.is_empty(),
            Self::Current(columns) => columns.is_empty(),
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Normalize into current-format entries.
    pub fn entries(&self) -> Vec<SavedColumn> {
        match self {
            Self::Legacy(fields) => fields
                .iter()
                .map(|field| SavedColumn::new(field.clone(), true))
                .collect(),
            Self::Current(columns) => columns.clone(),
        }
    }
}

#[cfg(test)]
#[path = "saved_tests.rs"]
mod tests;
