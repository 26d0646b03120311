use super::*;
use crate::store::MemoryViewStore;
use colkeeper_dom::InMemoryGrid;
use serde_json::json;

const NATIVE: &str = r#"<html><body><table id="inv">
  <thead><tr><th data-field="a">A</th><th data-field="b">B</th><th data-field="c">C</th></tr></thead>
  <tbody><tr><td>1</td><td>2</td><td>3</td></tr></tbody>
</table></body></html>"#;

const URL: &str = "https://app.example.com/fatture?tab=1";

fn setup(html: &str) -> (Arc<MemoryViewStore>, ViewEngine, Page, TableDescriptor) {
    let store = Arc::new(MemoryViewStore::new());
    let engine = ViewEngine::new(store.clone());
    let page = Page::from_html(html, URL).unwrap();
    let table = engine.describe_tables(&page).remove(0);
    (store, engine, page, table)
}

fn live_fields(engine: &ViewEngine, page: &Page, table: &TableDescriptor) -> Vec<String> {
    engine
        .columns(page, table)
        .into_iter()
        .filter(|c| c.visible)
        .filter_map(|c| c.field)
        .collect()
}

#[tokio::test]
async fn test_no_saved() {
    let (_, engine, page, table) = setup(NATIVE);
    let outcome = engine.apply_saved_order(&page, &table).await.unwrap();
    assert_eq!(outcome, ApplyOutcome::NoSaved);
    assert_eq!(outcome.reason(), "no-saved");
}

#[tokio::test]
async fn test_save_then_apply_is_idempotent() {
    let (_, engine, page, table) = setup(NATIVE);
    let saved = vec![
        SavedColumn::new("c", true),
        SavedColumn::new("a", true),
        SavedColumn::new("b", false),
    ];
    engine.save(&page, &table, &saved).await.unwrap();

    let first = engine.apply_saved_order(&page, &table).await.unwrap();
    assert_eq!(first, ApplyOutcome::Applied(AdapterKind::NativeTable));
    assert_eq!(live_fields(&engine, &page, &table), vec!["c", "a"]);

    let second = engine.apply_saved_order(&page, &table).await.unwrap();
    assert_eq!(second, ApplyOutcome::AlreadyApplied);
    assert_eq!(second.reason(), "already-sorted");
}

#[tokio::test]
async fn test_all_hidden_view_is_applied() {
    let (_, engine, page, table) = setup(NATIVE);
    let saved = vec![
        SavedColumn::new("a", false),
        SavedColumn::new("b", false),
        SavedColumn::new("c", false),
    ];
    engine.save(&page, &table, &saved).await.unwrap();

    let first = engine.apply_saved_order(&page, &table).await.unwrap();
    assert_eq!(first, ApplyOutcome::Applied(AdapterKind::NativeTable));
    assert!(live_fields(&engine, &page, &table).is_empty());

    let second = engine.apply_saved_order(&page, &table).await.unwrap();
    assert_eq!(second, ApplyOutcome::AlreadyApplied);
}

#[tokio::test]
async fn test_save_writes_current_format_and_retires_legacy() {
    let (store, engine, page, table) = setup(NATIVE);
    store
        .set("view_cfg_v4:/fatture:inv", json!(["b", "a"]))
        .await
        .unwrap();

    let key = engine
        .save(&page, &table, &[SavedColumn::new("a", true).with_label("A")])
        .await
        .unwrap();

    assert_eq!(key, engine.view_key(&page, &table));
    assert!(key.starts_with("view_cfg_v5:/fatture:"));
    assert_eq!(
        store.get(&key).await.unwrap(),
        Some(json!([{"field": "a", "visible": true, "label": "A"}]))
    );
    assert!(store.get("view_cfg_v4:/fatture:inv").await.unwrap().is_none());
}

#[tokio::test]
async fn test_legacy_entry_preferred() {
    let (store, engine, page, table) = setup(NATIVE);
    store
        .set("view_cfg_v4:/fatture:inv", json!(["b", "a"]))
        .await
        .unwrap();
    store
        .set(&engine.view_key(&page, &table), json!([{"field": "c", "visible": true}]))
        .await
        .unwrap();

    let saved = engine.load_saved(&page, &table).await.unwrap().unwrap();
    assert_eq!(saved.key, "view_cfg_v4:/fatture:inv");
    assert!(saved.config.is_legacy());

    engine.apply_saved_order(&page, &table).await.unwrap();
    assert_eq!(live_fields(&engine, &page, &table), vec!["b", "a", "c"]);
}

#[tokio::test]
async fn test_empty_legacy_entry_falls_back_to_current() {
    let (store, engine, page, table) = setup(NATIVE);
    store.set("view_cfg_v4:/fatture:inv", json!([])).await.unwrap();
    let current = engine.view_key(&page, &table);
    store
        .set(&current, json!([{"field": "b", "visible": true}]))
        .await
        .unwrap();

    let saved = engine.load_saved(&page, &table).await.unwrap().unwrap();
    assert_eq!(saved.key, current);
}

#[tokio::test]
async fn test_not_ready_when_no_columns() {
    let (store, engine, page, table) = setup("<table id=\"inv\"></table>");
    store
        .set("view_cfg_v4:/fatture:inv", json!(["a"]))
        .await
        .unwrap();
    let outcome = engine.apply_saved_order(&page, &table).await.unwrap();
    assert_eq!(outcome, ApplyOutcome::NotReady);
}

#[tokio::test]
async fn test_failed_when_no_adapter_applies() {
    let (store, engine, page, table) = setup(
        r#"<div role="grid" id="g"><div role="columnheader">A</div><div role="columnheader">B</div></div>"#,
    );
    store.set("view_cfg_v4:/fatture:g", json!(["column_2"])).await.unwrap();
    let outcome = engine.apply_saved_order(&page, &table).await.unwrap();
    assert_eq!(outcome, ApplyOutcome::Failed);
    assert!(!outcome.is_applied());
}

#[tokio::test]
async fn test_grid_library_applied() {
    let (store, engine, page, table) = setup(r#"<m2c-view-invoice unique-id="inv"></m2c-view-invoice>"#);
    let grid = Arc::new(InMemoryGrid::with_definitions(vec![
        json!({"field": "a"}),
        json!({"field": "b"}),
    ]));
    page.update(|doc| doc.bind_grid(table.element, grid.clone()).unwrap());
    store.set("view_cfg_v4:/fatture:inv", json!(["b"])).await.unwrap();

    assert!(engine.has_grid(&page, &table));
    let outcome = engine.apply_saved_order(&page, &table).await.unwrap();
    assert_eq!(outcome, ApplyOutcome::Applied(AdapterKind::GridLibrary));
    assert_eq!(outcome.to_string(), "grid-library");
    assert_eq!(grid.fields(), vec!["b", "a"]);
}
