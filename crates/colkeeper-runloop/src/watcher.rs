//! Page watcher: turns page events into reapplication runs.

use std::collections::HashSet;
use std::sync::Arc;

use colkeeper_core::roots::collect_roots;
use colkeeper_core::locator::PAYLOAD_ATTRIBUTE;
use colkeeper_dom::{MutationRecord, NodeId, Page, PageEvent};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::reapplier::Reapplier;

/// Whether a mutation should schedule a run.
///
/// Only mutations inside an observed root count, and writes to the payload
/// attribute are ignored since the payload adapter produces them itself.
pub fn is_relevant(record: &MutationRecord, observed: &HashSet<NodeId>) -> bool {
    observed.contains(&record.root) && record.attribute_name() != Some(PAYLOAD_ATTRIBUTE)
}

/// Watches one page and drives its [`Reapplier`].
pub struct PageWatcher {
    reapplier: Arc<Reapplier>,
    cancel: CancellationToken,
}

/// Handle to a spawned watcher.
pub struct WatcherHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the watcher and wait for it to exit. An active run finishes on
    /// its own.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!("Page watcher task failed: {}", e);
        }
    }
}

impl PageWatcher {
    pub fn new(reapplier: Arc<Reapplier>) -> Self {
        Self {
            reapplier,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Subscribe to the page, trigger an initial run and keep watching until
    /// cancelled.
    pub fn spawn(self) -> WatcherHandle {
        let cancel = self.cancel.clone();
        let task = tokio::spawn(self.watch());
        WatcherHandle { cancel, task }
    }

    async fn watch(self) {
        let page = self.reapplier.page().clone();
        let config = self.reapplier.config().clone();
        let mut events = page.subscribe();
        let mut observed = observe(&page);

        let mut refresh = tokio::time::interval(config.root_refresh());
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
        refresh.reset();

        let mut deadline: Option<Instant> = None;
        info!(roots = observed.len(), "Page watcher started");
        self.trigger();

        loop {
            let debounce = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Page watcher shutting down");
                    break;
                }
                _ = debounce => {
                    deadline = None;
                    self.trigger();
                }
                _ = refresh.tick() => {
                    observed = observe(&page);
                }
                event = events.recv() => match event {
                    Ok(PageEvent::Mutation(record)) => {
                        if is_relevant(&record, &observed) {
                            deadline = Some(Instant::now() + config.debounce());
                        }
                    }
                    Ok(PageEvent::Load) | Ok(PageEvent::Navigated(_)) => {
                        debug!("Page load or navigation, re-attaching");
                        observed = observe(&page);
                        self.trigger();
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Page watcher lagged behind page events");
                        deadline = Some(Instant::now() + config.debounce());
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    }

    /// Start a run in the background; ignored by the reapplier if one is active.
    fn trigger(&self) {
        let reapplier = self.reapplier.clone();
        tokio::spawn(async move {
            reapplier.run().await;
        });
    }
}

fn observe(page: &Page) -> HashSet<NodeId> {
    collect_roots(&page.read()).into_iter().collect()
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
