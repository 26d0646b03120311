use super::*;
use colkeeper_dom::InMemoryGrid;
use serde_json::json;

fn definitions() -> Vec<Value> {
    vec![
        json!({"field": "a", "title": "A", "headerSort": false}),
        json!({"field": "b", "label": "Bee", "visible": false}),
    ]
}

fn host_with_inner_grid(grid: Arc<InMemoryGrid>) -> (Page, NodeId) {
    let page = Page::from_html(
        r#"<m2c-view-invoice><template shadowrootmode="open">
             <div class="wrapper"><div class="tabulator tabulator-dark"></div></div>
           </template></m2c-view-invoice>"#,
        "https://h.example/",
    )
    .unwrap();
    let host = page.update(|doc| {
        let host = doc.elements_by_tag(doc.root(), "m2c-view-invoice")[0];
        let shadow = doc.shadow_root(host).unwrap();
        let inner = doc
            .find_first(shadow, |d, n| d.has_class(n, "tabulator"))
            .unwrap();
        doc.bind_grid(inner, grid).unwrap();
        host
    });
    (page, host)
}

#[test]
fn test_extract_definitions_preserves_extras() {
    let grid = Arc::new(InMemoryGrid::with_definitions(definitions()));
    let (page, host) = host_with_inner_grid(grid);

    let columns = GridLibraryAdapter.extract_columns(&page, host).unwrap();
    assert_eq!(columns[0].extra["headerSort"], false);
    assert_eq!(columns[1].title.as_deref(), Some("Bee"));
    assert!(!columns[1].visible);
}

#[test]
fn test_extract_column_objects() {
    let grid = Arc::new(InMemoryGrid::with_column_objects(definitions()));
    let (page, host) = host_with_inner_grid(grid);

    let columns = GridLibraryAdapter.extract_columns(&page, host).unwrap();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[1].field.as_deref(), Some("b"));
    // Accessor objects have no label fallback beyond the field.
    assert_eq!(columns[1].title.as_deref(), Some("b"));
    assert!(columns[0].extra.is_empty());
}

#[test]
fn test_grid_bound_on_element() {
    let page = Page::from_html("<div class=\"ag-root-wrapper\"></div>", "https://h.example/").unwrap();
    let grid = Arc::new(InMemoryGrid::with_definitions(definitions()));
    let el = page.update(|doc| {
        let el = doc.elements_by_tag(doc.root(), "div")[0];
        doc.bind_grid(el, grid.clone()).unwrap();
        el
    });
    assert!(find_grid_instance(&page.read(), el).is_some());
}

#[test]
fn test_no_grid() {
    let page = Page::from_html("<table></table>", "https://h.example/").unwrap();
    let el = {
        let doc = page.read();
        doc.elements_by_tag(doc.root(), "table")[0]
    };
    assert!(GridLibraryAdapter.extract_columns(&page, el).is_none());
    assert!(matches!(
        GridLibraryAdapter.apply_columns(&page, el, &[]),
        Err(AdapterError::NotApplicable)
    ));
}

#[test]
fn test_apply_sets_columns_and_redraws() {
    let grid = Arc::new(InMemoryGrid::with_definitions(definitions()));
    let (page, host) = host_with_inner_grid(grid.clone());

    let mut columns = GridLibraryAdapter.extract_columns(&page, host).unwrap();
    columns.reverse();
    GridLibraryAdapter.apply_columns(&page, host, &columns).unwrap();

    assert_eq!(grid.fields(), vec!["b", "a"]);
    assert_eq!(grid.redraws(), 1);
    assert_eq!(grid.definitions()[1]["headerSort"], false);
}

#[test]
fn test_apply_failure_is_reported() {
    let grid = Arc::new(InMemoryGrid::with_definitions(definitions()).rejecting("locked"));
    let (page, host) = host_with_inner_grid(grid.clone());

    let result = GridLibraryAdapter.apply_columns(&page, host, &[ColumnDescriptor::new("a", "A")]);
    assert!(matches!(result, Err(AdapterError::Grid(_))));
    assert_eq!(grid.redraws(), 0);
}
