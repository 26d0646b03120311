//! `dispatch` subcommand: run one content action against a local page.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::info;

use colkeeper_analyzer_openai::OpenAiAnalyzer;
use colkeeper_config::{Config, StorageConfig};
use colkeeper_content::ContentContext;
use colkeeper_core::{MemoryViewStore, ViewEngine};
use colkeeper_dom::Page;
use colkeeper_protocols::ViewStore;
use colkeeper_runloop::Reapplier;
use colkeeper_store_sqlite::SqliteViewStore;

pub(crate) struct DispatchArgs<'a> {
    pub page: &'a Path,
    pub url: &'a str,
    pub action: &'a str,
    pub data: Option<&'a str>,
    pub apply_saved: bool,
    pub watch: Option<Duration>,
    pub dump: bool,
}

/// Handle the dispatch subcommand.
pub(crate) async fn handle_dispatch(
    config: &Config,
    args: DispatchArgs<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload: Value = match args.data {
        Some(raw) => serde_json::from_str(raw)?,
        None => Value::Null,
    };

    let html = tokio::fs::read_to_string(args.page).await?;
    let page = Page::from_html(&html, args.url)?;

    let store = open_store(config).await?;
    let context = build_context(config, page.clone(), store);

    if args.apply_saved {
        if let Some(report) = context.reapplier().run().await {
            info!("Applied saved views: {:?}", report);
        }
    }

    if let Some(window) = args.watch {
        let watcher = context.start_watcher();
        tokio::time::sleep(window).await;
        watcher.shutdown().await;
        info!(runs = context.reapplier().completed_runs(), "Watch window closed");
    }

    let response = context.run(args.action, payload).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if args.dump {
        println!("{}", page.to_html());
    }

    Ok(())
}

/// Open the configured view store.
pub(crate) async fn open_store(config: &Config) -> Result<Arc<dyn ViewStore>, Box<dyn std::error::Error>> {
    let StorageConfig { backend, .. } = &config.storage;
    match backend.as_str() {
        "sqlite" => {
            let path = config.storage_path();
            info!("Using SQLite view store at {}", path.display());
            Ok(Arc::new(SqliteViewStore::open(&path).await?))
        }
        _ => Ok(Arc::new(MemoryViewStore::new())),
    }
}

/// Wire a content context for `page` from configuration.
pub(crate) fn build_context(config: &Config, page: Page, store: Arc<dyn ViewStore>) -> ContentContext {
    let engine = Arc::new(ViewEngine::new(store.clone()));
    let reapplier = Arc::new(Reapplier::new(engine, page, config.scheduler.clone()));
    let analyzer = OpenAiAnalyzer::new(config.ai.clone()).with_cache(store);

    ContentContext::new(reapplier)
        .with_analyzer(Arc::new(analyzer))
        .with_snapshot_config(config.snapshot.clone())
}
