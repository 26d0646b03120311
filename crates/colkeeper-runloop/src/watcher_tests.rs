use super::*;
use std::time::Duration;

use colkeeper_config::SchedulerConfig;
use colkeeper_core::{MemoryViewStore, ViewEngine};
use colkeeper_dom::MutationKind;

const URL: &str = "https://app.example.com/fatture";

const NATIVE: &str = r#"<html><body><table>
  <thead><tr><th data-field="a">A</th><th data-field="b">B</th></tr></thead>
</table></body></html>"#;

fn watched() -> (Arc<Reapplier>, WatcherHandle) {
    let page = Page::from_html(NATIVE, URL).unwrap();
    let engine = Arc::new(ViewEngine::new(Arc::new(MemoryViewStore::new())));
    let config = SchedulerConfig {
        max_iterations: 1,
        ..SchedulerConfig::default()
    };
    let reapplier = Arc::new(Reapplier::new(engine, page, config));
    let handle = PageWatcher::new(reapplier.clone()).spawn();
    (reapplier, handle)
}

fn set_table_attribute(page: &Page, name: &str) {
    page.update(|doc| {
        let root = doc.root();
        let table = doc.elements_by_tag(root, "table")[0];
        doc.set_attribute(table, name, "x").unwrap();
    });
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[test]
fn test_is_relevant() {
    let root = NodeId::from_raw(0);
    let observed: HashSet<NodeId> = [root].into_iter().collect();
    let record = |root, kind| MutationRecord {
        root,
        target: NodeId::from_raw(5),
        kind,
    };

    assert!(is_relevant(&record(root, MutationKind::ChildList), &observed));
    assert!(is_relevant(
        &record(root, MutationKind::Attribute { name: "class".to_string() }),
        &observed
    ));
    assert!(!is_relevant(
        &record(root, MutationKind::Attribute { name: PAYLOAD_ATTRIBUTE.to_string() }),
        &observed
    ));
    assert!(!is_relevant(
        &record(NodeId::from_raw(9), MutationKind::ChildList),
        &observed
    ));
}

#[tokio::test(start_paused = true)]
async fn test_initial_run_on_start() {
    let (reapplier, handle) = watched();
    sleep_ms(400).await;
    assert_eq!(reapplier.completed_runs(), 1);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_load_triggers_run() {
    let (reapplier, handle) = watched();
    sleep_ms(400).await;

    reapplier.page().fire_load();
    sleep_ms(400).await;
    assert_eq!(reapplier.completed_runs(), 2);

    reapplier.page().push_state("/fatture/2").unwrap();
    sleep_ms(400).await;
    assert_eq!(reapplier.completed_runs(), 3);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_mutation_is_debounced() {
    let (reapplier, handle) = watched();
    sleep_ms(400).await;

    set_table_attribute(reapplier.page(), "class");
    sleep_ms(300).await;
    set_table_attribute(reapplier.page(), "title");
    sleep_ms(400).await;
    assert_eq!(reapplier.completed_runs(), 1);

    sleep_ms(500).await;
    assert_eq!(reapplier.completed_runs(), 2);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_payload_attribute_is_ignored() {
    let (reapplier, handle) = watched();
    sleep_ms(400).await;

    set_table_attribute(reapplier.page(), PAYLOAD_ATTRIBUTE);
    sleep_ms(1000).await;
    assert_eq!(reapplier.completed_runs(), 1);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_watching() {
    let (reapplier, handle) = watched();
    sleep_ms(400).await;

    let token = handle.cancellation_token();
    handle.shutdown().await;
    assert!(token.is_cancelled());

    reapplier.page().fire_load();
    sleep_ms(1000).await;
    assert_eq!(reapplier.completed_runs(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_external_cancellation_token() {
    let page = Page::from_html(NATIVE, URL).unwrap();
    let engine = Arc::new(ViewEngine::new(Arc::new(MemoryViewStore::new())));
    let config = SchedulerConfig {
        max_iterations: 1,
        ..SchedulerConfig::default()
    };
    let reapplier = Arc::new(Reapplier::new(engine, page, config));

    let parent = CancellationToken::new();
    let handle = PageWatcher::new(reapplier.clone())
        .with_cancellation(parent.child_token())
        .spawn();
    sleep_ms(400).await;
    assert_eq!(reapplier.completed_runs(), 1);

    parent.cancel();
    assert!(handle.cancellation_token().is_cancelled());
    handle.shutdown().await;

    reapplier.page().fire_load();
    sleep_ms(1000).await;
    assert_eq!(reapplier.completed_runs(), 1);
}
