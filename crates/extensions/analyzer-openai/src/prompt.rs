//! Prompt construction and reply parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use colkeeper_protocols::analysis::{ANALYSIS_SCHEMA_VERSION, PageSnapshot};

/// System message sent with every analysis request.
pub const SYSTEM_PROMPT: &str = "Sei un assistente che produce solo JSON valido.";

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```json\s*(.*?)```").expect("fenced json pattern is a valid regex")
});

/// Build the user prompt: instructions, the expected answer shape, then
/// the compact snapshot.
pub fn create_prompt(snapshot: &PageSnapshot) -> Result<String, serde_json::Error> {
    let shape = json!({
        "schema_version": ANALYSIS_SCHEMA_VERSION,
        "detected_components": [
            { "type": "table|form|chart", "id": "string", "confidence": "0-1", "notes": "string" }
        ],
        "recommended_actions": [
            { "action": "string", "reason": "string", "priority": "low|medium|high" }
        ],
        "table_configs": [
            {
                "table_id": "string",
                "columns": [{ "name": "string", "data_type": "string", "suggested_visibility": "show|hide" }],
                "possible_actions": ["hide", "reorder", "filter"]
            }
        ]
    });

    Ok([
        "Analizza lo snapshot ridotto di una pagina web e proponi miglioramenti UX sui componenti tabellari.".to_string(),
        "Rispondi SOLO con JSON valido e senza testo aggiuntivo.".to_string(),
        "Schema obbligatorio:".to_string(),
        format!("{:#}", shape),
        "Input snapshot:".to_string(),
        serde_json::to_string(snapshot)?,
    ]
    .join("\n\n"))
}

/// Pull the JSON document out of a model reply.
///
/// A ```` ```json ```` fence wins; otherwise the text between the first `{`
/// and the last `}`.
pub fn extract_json_block(text: &str) -> Option<&str> {
    if let Some(inner) = FENCED_JSON.captures(text).and_then(|c| c.get(1)) {
        let trimmed = inner.as_str().trim();
        if !trimmed.is_empty() {
            return Some(trimmed);
        }
    }

    let first = text.find('{')?;
    let last = text.rfind('}')?;
    (last > first).then(|| &text[first..=last])
}
