//! Shared page handle.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tokio::sync::broadcast;
use tracing::debug;
use url::Url;

use crate::document::Document;
use crate::error::DomError;
use crate::event::PageEvent;

const EVENT_CAPACITY: usize = 1024;

/// Cloneable handle to a live page.
///
/// Reads take a shared lock on the document. Writes go through
/// [`Page::update`], which publishes the mutation records produced by the
/// closure once the lock is released.
#[derive(Clone)]
pub struct Page {
    document: Arc<RwLock<Document>>,
    events: broadcast::Sender<PageEvent>,
}

impl Page {
    /// Create an empty page at `url`.
    pub fn new(url: Url) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            document: Arc::new(RwLock::new(Document::new(url))),
            events,
        }
    }

    /// Parse `html` into a new page at `url`.
    pub fn from_html(html: &str, url: &str) -> Result<Self, DomError> {
        let url = Url::parse(url)?;
        let mut document = Document::new(url);
        crate::html::import(&mut document, html)?;
        // Construction is not observable.
        document.take_mutations();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            document: Arc::new(RwLock::new(document)),
            events,
        })
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Document> {
        self.document.read()
    }

    /// Run `f` with write access and publish the resulting mutations.
    pub fn update<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        let (result, records) = {
            let mut document = self.document.write();
            let result = f(&mut document);
            (result, document.take_mutations())
        };
        if !records.is_empty() {
            debug!(count = records.len(), "Publishing page mutations");
        }
        for record in records {
            // No subscribers is fine.
            let _ = self.events.send(PageEvent::Mutation(record));
        }
        result
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.events.subscribe()
    }

    pub fn url(&self) -> Url {
        self.document.read().url().clone()
    }

    /// Signal that the page finished loading.
    pub fn fire_load(&self) {
        let _ = self.events.send(PageEvent::Load);
    }

    /// Client-side navigation: change the location without reloading.
    pub fn push_state(&self, url: &str) -> Result<(), DomError> {
        let url = self.url().join(url)?;
        self.document.write().set_url(url.clone());
        let _ = self.events.send(PageEvent::Navigated(url));
        Ok(())
    }

    /// Serialize the document (shadow roots as declarative templates).
    pub fn to_html(&self) -> String {
        crate::serialize::to_html(&self.document.read())
    }
}

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;
