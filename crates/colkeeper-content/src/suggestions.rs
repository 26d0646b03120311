//! Suggestions derived from a page analysis.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use colkeeper_protocols::{Analysis, SavedColumn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ContentError;
use crate::messages;

/// What applying a suggestion does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionCommand {
    HideNonEssential {
        #[serde(rename = "fieldsToHide")]
        fields_to_hide: Vec<String>,
    },
    ReorderColumns {
        #[serde(rename = "orderedFields")]
        ordered_fields: Vec<String>,
    },
    /// Informational only.
    HighlightColumn {
        #[serde(rename = "sourceAction")]
        source_action: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    pub command: SuggestionCommand,
}

/// Build the suggestions of an analysis.
///
/// The first table config yields a hide suggestion for columns the model
/// wants hidden and a reorder suggestion when it names more than one column;
/// every recommended action yields an informational suggestion.
pub fn normalize(analysis: &Analysis) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    let table = analysis.table_configs.first();
    let table_id = table.map(|t| t.table_id.clone()).filter(|id| !id.is_empty());
    let id_suffix = table_id.clone().unwrap_or_else(|| "table0".to_string());

    if let Some(table) = table {
        let hide: Vec<String> = table
            .columns
            .iter()
            .filter(|c| c.should_hide())
            .filter_map(|c| c.name.clone())
            .filter(|n| !n.is_empty())
            .collect();
        if !hide.is_empty() {
            suggestions.push(Suggestion {
                id: format!("hide_non_essential:{}", id_suffix),
                title: "Tabella rilevata: nascondi colonne non essenziali".to_string(),
                description: format!("Colonne suggerite da nascondere: {}", hide.join(", ")),
                table_id: table_id.clone(),
                command: SuggestionCommand::HideNonEssential {
                    fields_to_hide: hide,
                },
            });
        }

        let ordered: Vec<String> = table
            .columns
            .iter()
            .filter_map(|c| c.name.clone())
            .filter(|n| !n.is_empty())
            .collect();
        if ordered.len() > 1 {
            suggestions.push(Suggestion {
                id: format!("reorder_columns:{}", id_suffix),
                title: "Riordino consigliato colonne".to_string(),
                description: format!("Ordine proposto: {}", ordered.join(" → ")),
                table_id: table_id.clone(),
                command: SuggestionCommand::ReorderColumns {
                    ordered_fields: ordered,
                },
            });
        }
    }

    for action in &analysis.recommended_actions {
        let label = action
            .action
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "Automazione suggerita".to_string());
        let reason = action
            .reason
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "Nessuna descrizione".to_string());
        suggestions.push(Suggestion {
            id: format!("auto:{}", label),
            title: format!("Automazione rilevata: {}", label),
            description: reason,
            table_id: table_id.clone(),
            command: SuggestionCommand::HighlightColumn {
                source_action: label,
            },
        });
    }

    suggestions
}

/// Outcome of planning a suggestion against a table's current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionPlan {
    /// The view to save; `None` for informational suggestions.
    pub columns: Option<Vec<SavedColumn>>,
    pub irreversible: bool,
    pub message: String,
}

fn names_column(name: &str, column: &SavedColumn) -> bool {
    column.field == name || column.label.as_deref() == Some(name)
}

impl SuggestionCommand {
    /// Decode the `suggestion` member of a dispatch payload.
    pub fn from_payload(payload: &Value) -> Result<Self, ContentError> {
        let value = payload
            .get("suggestion")
            .ok_or_else(|| ContentError::InvalidSuggestion("missing suggestion".to_string()))?;
        serde_json::from_value(value.clone())
            .map_err(|e| ContentError::InvalidSuggestion(e.to_string()))
    }

    /// Plan this command against `current`, the table's editable view.
    ///
    /// Names match a column by field or by label. A hide or reorder that
    /// matches no column is invalid.
    pub fn plan(&self, current: &[SavedColumn]) -> Result<SuggestionPlan, ContentError> {
        match self {
            Self::HideNonEssential { fields_to_hide } => {
                let mut hidden = Vec::new();
                let columns: Vec<SavedColumn> = current
                    .iter()
                    .cloned()
                    .map(|mut column| {
                        if fields_to_hide.iter().any(|name| names_column(name, &column)) {
                            column.visible = false;
                            hidden.push(column.field.clone());
                        }
                        column
                    })
                    .collect();
                if hidden.is_empty() {
                    return Err(ContentError::InvalidSuggestion(
                        "no column to hide".to_string(),
                    ));
                }
                Ok(SuggestionPlan {
                    message: messages::preview_hide(&hidden),
                    columns: Some(columns),
                    irreversible: true,
                })
            }
            Self::ReorderColumns { ordered_fields } => {
                let mut rest: Vec<Option<SavedColumn>> = current.iter().cloned().map(Some).collect();
                let mut columns = Vec::new();
                for name in ordered_fields {
                    let slot = rest
                        .iter_mut()
                        .find(|slot| matches!(slot, Some(c) if names_column(name, c)));
                    if let Some(column) = slot.and_then(Option::take) {
                        columns.push(column);
                    }
                }
                if columns.is_empty() {
                    return Err(ContentError::InvalidSuggestion(
                        "no column to reorder".to_string(),
                    ));
                }
                let order: Vec<String> = columns.iter().map(|c| c.field.clone()).collect();
                columns.extend(rest.into_iter().flatten());
                Ok(SuggestionPlan {
                    message: messages::preview_reorder(&order),
                    columns: Some(columns),
                    irreversible: false,
                })
            }
            Self::HighlightColumn { source_action } => Ok(SuggestionPlan {
                message: messages::informational(source_action),
                columns: None,
                irreversible: false,
            }),
        }
    }
}

/// A recorded user decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionDecision {
    pub status: DecisionStatus,
    pub at: DateTime<Utc>,
}

impl SuggestionDecision {
    pub fn now(status: DecisionStatus) -> Self {
        Self {
            status,
            at: Utc::now(),
        }
    }
}

/// Decisions of one table, by suggestion id.
pub type DecisionState = BTreeMap<String, SuggestionDecision>;

/// Decode stored decisions; anything unreadable counts as no decisions.
pub fn decode_state(value: Option<Value>) -> DecisionState {
    value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

/// Suggestions the user has not decided on yet.
pub fn pending(suggestions: Vec<Suggestion>, state: &DecisionState) -> Vec<Suggestion> {
    suggestions
        .into_iter()
        .filter(|s| !state.contains_key(&s.id))
        .collect()
}

#[cfg(test)]
#[path = "suggestions_tests.rs"]
mod tests;
