use super::*;
use std::sync::Arc;

use colkeeper_core::MemoryViewStore;

const PAGE: &str = r#"<html><head><title>Fatture  passive</title></head><body>
  <h1 class="page-title">Elenco   fatture</h1>
  <form id="filters"><input name="q"><button>Cerca</button></form>
  <table id="inv">
    <thead><tr>
      <th data-field="num">Numero</th><th data-field="data">Data</th>
      <th data-field="tot">Totale</th><th data-field="pag">Pagata</th><th data-field="note">Note</th>
    </tr></thead>
    <tbody>
      <tr><td>1</td><td>05/01/2026</td><td>€ 1.200,00</td><td>Sì</td><td>urgente</td></tr>
      <tr><td>2</td><td>2026-01-07</td><td>€ 80,50</td><td>no</td><td>42</td></tr>
    </tbody>
  </table>
  <div role="table" class="grid"><div role="columnheader">X</div></div>
</body></html>"#;

fn setup() -> (ViewEngine, Page) {
    let engine = ViewEngine::new(Arc::new(MemoryViewStore::new()));
    let page = Page::from_html(PAGE, "https://erp.example.com/fatture?anno=2026#top").unwrap();
    (engine, page)
}

#[test]
fn test_truncate_text() {
    assert_eq!(truncate_text("  a \n  b ", 10), "a b");
    assert_eq!(truncate_text("abcdef", 3), "abc…");
    assert_eq!(truncate_text("", 3), "");
}

#[test]
fn test_infer_type() {
    assert_eq!(infer_type(&["1", "2.500", "-3,5"]), "number");
    assert_eq!(infer_type(&["€ 10,00", "1.200,00 EUR"]), "currency");
    assert_eq!(infer_type(&["05/01/2026", "2026-01-07"]), "date");
    assert_eq!(infer_type(&["Sì", "no", ""]), "boolean");
    assert_eq!(infer_type(&["urgente", "42"]), "text");
    assert_eq!(infer_type(&["", " "]), "unknown");
    assert_eq!(infer_type::<&str>(&[]), "unknown");
}

#[test]
fn test_dom_summary() {
    let (_, page) = setup();
    let config = SnapshotConfig::default();
    let summary = dom_summary(&page.read(), &config);

    let tags: Vec<&str> = summary.iter().map(|n| n.tag.as_str()).collect();
    assert_eq!(tags, vec!["h1", "form", "input", "button", "table", "div"]);
    assert_eq!(summary[0].text, "Elenco fatture");
    assert_eq!(summary[0].class_name, "page-title");
    assert_eq!(summary[1].id.as_deref(), Some("filters"));
    assert_eq!(summary[5].role.as_deref(), Some("table"));
}

#[test]
fn test_dom_summary_is_bounded() {
    let (_, page) = setup();
    let config = SnapshotConfig {
        max_dom_nodes: 2,
        text_limit: 4,
        ..SnapshotConfig::default()
    };
    let summary = dom_summary(&page.read(), &config);
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].text, "Elen…");
}

#[test]
fn test_table_metadata_infers_native_types() {
    let (engine, page) = setup();
    let tables = engine.describe_tables(&page);
    let metadata = table_metadata(&engine, &page, &tables, &SnapshotConfig::default());

    assert_eq!(metadata.len(), 2);
    let native = &metadata[0];
    assert_eq!(native.table_id, tables[0].table_id);
    assert_eq!(native.column_count, 5);
    let types: Vec<&str> = native.columns.iter().map(|c| c.inferred_type.as_str()).collect();
    assert_eq!(types, vec!["number", "date", "currency", "boolean", "text"]);
    assert_eq!(native.columns[0].header.as_deref(), Some("Numero"));

    assert_eq!(metadata[1].columns[0].inferred_type, "unknown");
}

#[test]
fn test_table_metadata_limits() {
    let (engine, page) = setup();
    let tables = engine.describe_tables(&page);
    let config = SnapshotConfig {
        max_tables: 1,
        max_columns: 2,
        ..SnapshotConfig::default()
    };
    let metadata = table_metadata(&engine, &page, &tables, &config);
    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata[0].column_count, 2);
}

#[test]
fn test_build_snapshot() {
    let (engine, page) = setup();
    let tables = engine.describe_tables(&page);
    let snapshot = build_snapshot(&engine, &page, &tables, &SnapshotConfig::default());

    assert_eq!(snapshot.page.origin, "https://erp.example.com");
    assert_eq!(snapshot.page.pathname, "/fatture");
    assert_eq!(snapshot.page.title, "Fatture passive");
    assert_eq!(snapshot.policy.allowed_actions, vec!["hide", "reorder"]);
    assert_eq!(snapshot.policy.max_suggestions, 5);
}
