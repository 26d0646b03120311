use super::*;
use crate::roots::collect_roots;
use colkeeper_dom::Page;

fn located(html: &str) -> Vec<(String, Strategy)> {
    let page = Page::from_html(html, "https://h.example/app").unwrap();
    let doc = page.read();
    let roots = collect_roots(&doc);
    locate(&doc, &roots)
        .into_iter()
        .map(|(id, strategy)| (doc.tag(id).unwrap_or_default().to_string(), strategy))
        .collect()
}

#[test]
fn test_each_strategy() {
    let found = located(
        r#"<body>
             <div class="tabulator"></div>
             <div role="grid"></div>
             <table></table>
             <b2w-table-v2></b2w-table-v2>
           </body>"#,
    );
    assert_eq!(
        found,
        vec![
            ("b2w-table-v2".to_string(), Strategy::WebComponent),
            ("table".to_string(), Strategy::NativeTable),
            ("div".to_string(), Strategy::AriaGrid),
            ("div".to_string(), Strategy::LibraryGrid),
        ]
    );
}

#[test]
fn test_first_strategy_wins_attribution() {
    let found = located(r#"<table role="grid" class="tabulator"></table>"#);
    assert_eq!(found, vec![("table".to_string(), Strategy::NativeTable)]);
}

#[test]
fn test_payload_attribute_marks_component() {
    let found = located(r#"<x-list payload-columns='[{"field":"a"}]'></x-list><x-list payload-columns=""></x-list>"#);
    assert_eq!(found, vec![("x-list".to_string(), Strategy::WebComponent)]);
}

#[test]
fn test_shadow_root_tables_follow_document() {
    let found = located(
        r#"<body>
             <m2c-view-invoice><template shadowrootmode="open"><table></table></template></m2c-view-invoice>
             <div role="treegrid"></div>
           </body>"#,
    );
    assert_eq!(
        found,
        vec![
            ("m2c-view-invoice".to_string(), Strategy::WebComponent),
            ("div".to_string(), Strategy::AriaGrid),
            ("table".to_string(), Strategy::NativeTable),
        ]
    );
}

#[test]
fn test_no_tables() {
    assert!(located("<body><p>nothing</p></body>").is_empty());
}

#[test]
fn test_strategy_names() {
    assert_eq!(Strategy::WebComponent.to_string(), "web-component");
    assert_eq!(
        serde_json::to_value(Strategy::LibraryGrid).unwrap(),
        serde_json::json!("library-grid")
    );
}
