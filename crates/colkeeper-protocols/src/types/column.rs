//! Column descriptors: the uniform view over heterogeneous table APIs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One column of a live table.
///
/// `field` is the stable key of the column. Grid libraries may omit it for
/// group or decoration columns; header-cell extraction always fills it in,
/// falling back to a positional `column_N` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct ColumnDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub visible: bool,

    /// Library-specific keys carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ColumnDescriptor {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            title: Some(title.into()),
            visible: true,
            extra: Map::new(),
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Build a descriptor from a column-definition object.
    ///
    /// Numeric fields are stringified, `title` falls back to `label` and then
    /// to the field, and visibility is only false when explicitly `false`.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let field = object.get("field").and_then(scalar_to_string);
        let title = object
            .get("title")
            .and_then(scalar_to_string)
            .or_else(|| object.get("label").and_then(scalar_to_string))
            .or_else(|| field.clone());
        let visible = object.get("visible").and_then(Value::as_bool) != Some(false);

        let extra = object
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "field" | "title" | "visible"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            field,
            title,
            visible,
            extra,
        }
    }

    /// Human readable name: title, else field, else empty.
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.field.as_deref())
            .unwrap_or("")
    }
}

impl TryFrom<Value> for ColumnDescriptor {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(object) => Ok(Self::from_object(&object)),
            other => Err(format!("column definition must be an object, got {}", other)),
        }
    }
}

/// Parse a JSON array of column definitions. Non-object entries are skipped.
pub fn columns_from_value(value: &Value) -> Option<Vec<ColumnDescriptor>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_object)
            .map(ColumnDescriptor::from_object)
            .collect(),
    )
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "column_tests.rs"]
mod tests;
