//! Column lists as shown to and sent back by the host.

use std::collections::HashSet;

use colkeeper_protocols::{ColumnDescriptor, SavedColumn, SavedViewConfig};
use serde_json::Value;

use crate::error::ContentError;

fn live_label(column: &ColumnDescriptor) -> String {
    column.display_name().to_string()
}

/// The column list a host edits: saved entries first, then live columns the
/// saved view does not mention.
///
/// Current-format entries are listed even when the live table lacks them,
/// labelled from the live column when present. Legacy entries are listed only
/// when live. Unmentioned live columns are listed visible. Columns without a
/// field cannot be saved and are left out.
pub fn merge_saved(live: &[ColumnDescriptor], saved: Option<&SavedViewConfig>) -> Vec<SavedColumn> {
    let find = |field: &str| live.iter().find(|c| c.field.as_deref() == Some(field));
    let mut merged = Vec::new();
    let mut seen = HashSet::new();

    match saved {
        Some(SavedViewConfig::Current(entries)) => {
            for entry in entries {
                let label = find(&entry.field)
                    .map(live_label)
                    .or_else(|| entry.label.clone())
                    .unwrap_or_else(|| entry.field.clone());
                merged.push(SavedColumn::new(entry.field.clone(), entry.visible).with_label(label));
                seen.insert(entry.field.clone());
            }
        }
        Some(SavedViewConfig::Legacy(fields)) => {
            for field in fields {
                if let Some(column) = find(field) {
                    merged.push(SavedColumn::new(field.clone(), true).with_label(live_label(column)));
                    seen.insert(field.clone());
                }
            }
        }
        None => {}
    }

    for column in live {
        let Some(field) = &column.field else {
            continue;
        };
        if seen.insert(field.clone()) {
            merged.push(SavedColumn::new(field.clone(), true).with_label(live_label(column)));
        }
    }
    merged
}

/// Columns sent with `save_config`: a bare list or `{columns: [...]}`.
///
/// Bare field names are accepted and saved visible. Entries without a field
/// are skipped; an empty result is an error.
pub fn parse_saved_columns(payload: &Value) -> Result<Vec<SavedColumn>, ContentError> {
    let list = match payload {
        Value::Array(_) => payload,
        Value::Object(object) => object
            .get("columns")
            .ok_or_else(|| ContentError::InvalidPayload("missing columns".to_string()))?,
        _ => {
            return Err(ContentError::InvalidPayload(
                "expected a column list".to_string(),
            ));
        }
    };

    SavedViewConfig::from_value(list)
        .map(|config| config.entries())
        .filter(|entries| !entries.is_empty())
        .ok_or_else(|| ContentError::InvalidPayload("no columns to save".to_string()))
}

#[cfg(test)]
#[path = "columns_tests.rs"]
mod tests;
