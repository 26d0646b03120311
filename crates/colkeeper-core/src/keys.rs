//! Storage keys.

/// Prefix of legacy, attribute-identified saved views.
pub const LEGACY_VIEW_PREFIX: &str = "view_cfg_v4";

/// Prefix of current saved views.
pub const VIEW_PREFIX: &str = "view_cfg_v5";

const SUGGESTION_STATE_PREFIX: &str = "suggestion_state";

/// `view_cfg_v4:<pathname>:<uid>`
pub fn legacy_view_key(pathname: &str, uid: &str) -> String {
    format!("{}:{}:{}", LEGACY_VIEW_PREFIX, pathname, uid)
}

/// `view_cfg_v5:<pathname>:<tableId>`
pub fn view_key(pathname: &str, table_id: &str) -> String {
    format!("{}:{}:{}", VIEW_PREFIX, pathname, table_id)
}

/// `suggestion_state:<pathname>:<tableId>`, `default-table` when the table is unknown.
pub fn suggestion_state_key(pathname: &str, table_id: Option<&str>) -> String {
    let table = table_id.filter(|t| !t.is_empty()).unwrap_or("default-table");
    format!("{}:{}:{}", SUGGESTION_STATE_PREFIX, pathname, table)
}
