//! The content context of one page.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use colkeeper_config::SnapshotConfig;
use colkeeper_core::{TableDescriptor, ViewEngine, keys, primary_table};
use colkeeper_dom::Page;
use colkeeper_protocols::{
    Analysis, AnalysisError, AnalysisRequest, AnalysisSource, PageAnalyzer, SavedColumn, ViewStore,
};
use colkeeper_runloop::{PageWatcher, Reapplier, WatcherHandle};
use futures::FutureExt;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::action::Action;
use crate::columns::{merge_saved, parse_saved_columns};
use crate::error::ContentError;
use crate::messages;
use crate::snapshot::build_snapshot;
use crate::suggestions::{
    DecisionStatus, SuggestionCommand, SuggestionDecision, decode_state, normalize, pending,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableRequest {
    #[serde(default)]
    table_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    #[serde(default)]
    force_refresh: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecisionRequest {
    #[serde(default)]
    table_id: Option<String>,
    #[serde(default)]
    suggestion_id: Option<String>,
}

/// Decode an object payload; anything else decodes as the default request.
fn request<T: DeserializeOwned + Default>(payload: &Value) -> Result<T, ContentError> {
    match payload {
        Value::Object(_) => serde_json::from_value(payload.clone())
            .map_err(|e| ContentError::InvalidPayload(e.to_string())),
        _ => Ok(T::default()),
    }
}

fn failure(msg: impl Into<String>) -> Value {
    json!({ "ok": false, "msg": msg.into() })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected panic".to_string()
    }
}

/// Owns the scheduler of one page and answers host actions against it.
pub struct ContentContext {
    reapplier: Arc<Reapplier>,
    analyzer: Option<Arc<dyn PageAnalyzer>>,
    snapshot: SnapshotConfig,
}

impl ContentContext {
    pub fn new(reapplier: Arc<Reapplier>) -> Self {
        Self {
            reapplier,
            analyzer: None,
            snapshot: SnapshotConfig::default(),
        }
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn PageAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn with_snapshot_config(mut self, config: SnapshotConfig) -> Self {
        self.snapshot = config;
        self
    }

    pub fn reapplier(&self) -> &Arc<Reapplier> {
        &self.reapplier
    }

    pub fn page(&self) -> &Page {
        self.reapplier.page()
    }

    fn engine(&self) -> &ViewEngine {
        self.reapplier.engine()
    }

    fn store(&self) -> &Arc<dyn ViewStore> {
        self.engine().store()
    }

    /// Start watching the page for changes.
    pub fn start_watcher(&self) -> WatcherHandle {
        PageWatcher::new(self.reapplier.clone()).spawn()
    }

    /// Run one action.
    ///
    /// Always answers with an object carrying `ok`; failures, including
    /// panics inside a handler, carry a user-facing `msg`.
    pub async fn run(&self, action: &str, payload: Value) -> Value {
        debug!(action, "Dispatching action");
        match AssertUnwindSafe(self.dispatch(action, payload))
            .catch_unwind()
            .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                match &e {
                    ContentError::UnknownAction(_) | ContentError::NoTables => {
                        debug!(action, "{}", e)
                    }
                    _ => warn!(action, "Action failed: {}", e),
                }
                failure(e.user_message())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(action, "Action panicked: {}", message);
                failure(messages::error(message))
            }
        }
    }

    async fn dispatch(&self, action: &str, payload: Value) -> Result<Value, ContentError> {
        let action: Action = action.parse()?;
        let tables = self.engine().describe_tables(self.page());
        let wanted: TableRequest = request(&payload)?;
        let table = primary_table(&tables, wanted.table_id.as_deref()).ok_or(ContentError::NoTables)?;

        match action {
            Action::Scan => self.scan(&tables, table).await,
            Action::SaveConfig => self.save_config(table, &payload).await,
            Action::Debug => self.debug(table).await,
            Action::AnalyzePage => self.analyze_page(&tables, table, &payload).await,
            Action::PreviewSuggestion => self.preview_suggestion(table, &payload).await,
            Action::ApplySuggestion => self.apply_suggestion(table, &payload).await,
            Action::DismissSuggestion => self.dismiss_suggestion(table, &payload).await,
            Action::Restore => {
                self.reapply().await;
                Ok(json!({ "ok": true }))
            }
            Action::Invert => Ok(json!({ "ok": true })),
        }
    }

    /// Run the scheduler and wait for it; a run already in progress is left alone.
    async fn reapply(&self) {
        if self.reapplier.run().await.is_none() {
            debug!("Reapplication already in progress");
        }
    }

    /// Key of the table's saved view, or the key a save would write.
    async fn current_key(&self, table: &TableDescriptor) -> Result<String, ContentError> {
        Ok(match self.engine().load_saved(self.page(), table).await? {
            Some(saved) => saved.key,
            None => self.engine().view_key(self.page(), table),
        })
    }

    /// The editable view of a table: saved entries merged with live columns.
    async fn current_view(&self, table: &TableDescriptor) -> Result<Vec<SavedColumn>, ContentError> {
        let saved = self.engine().load_saved(self.page(), table).await?;
        let live = self.engine().columns(self.page(), table);
        Ok(merge_saved(&live, saved.as_ref().map(|s| &s.config)))
    }

    async fn scan(
        &self,
        tables: &[TableDescriptor],
        table: &TableDescriptor,
    ) -> Result<Value, ContentError> {
        let engine = self.engine();
        let page = self.page();
        let saved = engine.load_saved(page, table).await?;
        let live = engine.columns(page, table);
        let columns = merge_saved(&live, saved.as_ref().map(|s| &s.config));
        let view_key = match &saved {
            Some(saved) => saved.key.clone(),
            None => engine.view_key(page, table),
        };

        let mut summaries = Vec::with_capacity(tables.len());
        for other in tables {
            let known = engine.load_saved(page, other).await?.is_some();
            summaries.push(json!({
                "tableId": other.table_id,
                "label": other.label,
                "strategy": other.strategy,
                "columns": engine.columns(page, other).len(),
                "isKnown": known,
            }));
        }

        Ok(json!({
            "ok": true,
            "columns": columns,
            "isKnown": saved.is_some(),
            "viewKey": view_key,
            "tableId": table.table_id,
            "tables": summaries,
        }))
    }

    async fn save_config(&self, table: &TableDescriptor, payload: &Value) -> Result<Value, ContentError> {
        let columns = parse_saved_columns(payload)?;
        let key = self.engine().save(self.page(), table, &columns).await?;
        self.reapply().await;
        Ok(json!({ "ok": true, "msg": messages::CONFIG_SAVED, "viewKey": key }))
    }

    async fn debug(&self, table: &TableDescriptor) -> Result<Value, ContentError> {
        let key = self.current_key(table).await?;
        let columns = self.engine().columns(self.page(), table);
        let last_outcome = self
            .reapplier
            .last_outcome(&table.table_id)
            .map(|outcome| outcome.reason());
        Ok(json!({
            "ok": true,
            "dbg": {
                "tagName": table.tag.to_uppercase(),
                "key": key,
                "tableId": table.table_id,
                "strategy": table.strategy,
                "hasGrid": self.engine().has_grid(self.page(), table),
                "colsFound": columns.len(),
                "lastOutcome": last_outcome,
            }
        }))
    }

    async fn analyze_page(
        &self,
        tables: &[TableDescriptor],
        table: &TableDescriptor,
        payload: &Value,
    ) -> Result<Value, ContentError> {
        let analyzer = self
            .analyzer
            .as_ref()
            .ok_or_else(|| AnalysisError::ConfigInvalid("no analyzer configured".to_string()))?;
        let options: AnalyzeRequest = request(payload)?;

        let analysis_request = AnalysisRequest {
            snapshot: build_snapshot(self.engine(), self.page(), tables, &self.snapshot),
            url: self.page().url().to_string(),
            view_key: self.current_key(table).await?,
            force_refresh: options.force_refresh,
        };
        let reply = analyzer.analyze(analysis_request).await?;
        let analysis = Analysis::from_value(reply.payload)?;

        let suggestions = normalize(&analysis);
        let state_key = keys::suggestion_state_key(
            self.page().url().path(),
            suggestions.first().and_then(|s| s.table_id.as_deref()),
        );
        let state = decode_state(self.store().get(&state_key).await?);
        let suggestions = pending(suggestions, &state);
        info!(
            analyzer = analyzer.id(),
            source = ?reply.source,
            suggestions = suggestions.len(),
            "Page analyzed"
        );

        let msg = match reply.source {
            AnalysisSource::Cache => messages::ANALYSIS_FROM_CACHE,
            AnalysisSource::Model => messages::ANALYSIS_GENERATED,
        };
        Ok(json!({
            "ok": true,
            "msg": msg,
            "analysis": analysis,
            "suggestions": suggestions,
        }))
    }

    async fn preview_suggestion(
        &self,
        table: &TableDescriptor,
        payload: &Value,
    ) -> Result<Value, ContentError> {
        let command = SuggestionCommand::from_payload(payload)?;
        let plan = command.plan(&self.current_view(table).await?)?;
        Ok(json!({
            "ok": true,
            "msg": plan.message,
            "irreversible": plan.irreversible,
            "columns": plan.columns.unwrap_or_default(),
        }))
    }

    async fn apply_suggestion(
        &self,
        table: &TableDescriptor,
        payload: &Value,
    ) -> Result<Value, ContentError> {
        let command = SuggestionCommand::from_payload(payload)?;
        let plan = command.plan(&self.current_view(table).await?)?;
        if let Some(columns) = &plan.columns {
            self.engine().save(self.page(), table, columns).await?;
            self.reapply().await;
        }

        let decision: DecisionRequest = request(payload)?;
        if let Some(id) = &decision.suggestion_id {
            let state_table = decision.table_id.as_deref().unwrap_or(&table.table_id);
            self.record_decision(state_table, id, DecisionStatus::Accepted)
                .await?;
        }
        Ok(json!({ "ok": true, "msg": messages::SUGGESTION_APPLIED }))
    }

    async fn dismiss_suggestion(
        &self,
        table: &TableDescriptor,
        payload: &Value,
    ) -> Result<Value, ContentError> {
        let decision: DecisionRequest = request(payload)?;
        let id = decision
            .suggestion_id
            .as_deref()
            .ok_or_else(|| ContentError::InvalidPayload("missing suggestionId".to_string()))?;
        let state_table = decision.table_id.as_deref().unwrap_or(&table.table_id);
        self.record_decision(state_table, id, DecisionStatus::Rejected)
            .await?;
        Ok(json!({ "ok": true, "msg": messages::SUGGESTION_DISMISSED }))
    }

    async fn record_decision(
        &self,
        table_id: &str,
        suggestion_id: &str,
        status: DecisionStatus,
    ) -> Result<(), ContentError> {
        let key = keys::suggestion_state_key(self.page().url().path(), Some(table_id));
        let mut state = decode_state(self.store().get(&key).await?);
        state.insert(suggestion_id.to_string(), SuggestionDecision::now(status));
        self.store().set(&key, serde_json::to_value(&state)?).await?;
        debug!(key = %key, suggestion_id, ?status, "Recorded suggestion decision");
        Ok(())
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
