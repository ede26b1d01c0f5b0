use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use portfolio_time::{MockProvider, Time};
use portfolio_types::{CatalogEntry, Category, EntryDocument, EntryDraft, EntryId, EntryPatch};
use tokio::sync::Notify;

use crate::{CatalogStore, InMemoryStore, ListQuery, Result};

/// A draft that passes validation
pub(crate) fn draft(name: &str, category: Category) -> EntryDraft {
    EntryDraft {
        short_description: format!("{name} in brief"),
        detailed_description: format!("{name} at length"),
        tech_stack: vec!["Rust".into()],
        ..EntryDraft::new(name, category)
    }
}

pub(crate) fn mock_time() -> Arc<MockProvider> {
    Arc::new(MockProvider::new(
        Time::from_timestamp_millis(1_700_000_000_000).unwrap(),
    ))
}

/// An [`InMemoryStore`] that counts the reads that reach it
#[derive(Debug, Default)]
pub(crate) struct CountingStore {
    inner: InMemoryStore,
    lists: AtomicUsize,
    gets: AtomicUsize,
}

impl CountingStore {
    pub(crate) fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub(crate) fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogStore for CountingStore {
    async fn insert(&self, doc: &EntryDocument) -> Result<EntryId> {
        self.inner.insert(doc).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<CatalogEntry>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list(query).await
    }

    async fn get(&self, id: &EntryId) -> Result<Option<CatalogEntry>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(id).await
    }

    async fn update(&self, id: &EntryId, patch: &EntryPatch) -> Result<()> {
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &EntryId) -> Result<()> {
        self.inner.delete(id).await
    }
}

/// A [`CountingStore`] whose next read can be held after it has fetched its result, so a test
/// can land a write while that read is still in flight
#[derive(Debug, Default)]
pub(crate) struct HeldStore {
    inner: CountingStore,
    armed: AtomicBool,
    fetched: Notify,
    released: Notify,
}

impl HeldStore {
    pub(crate) fn hold_next_read(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Resolves once the held read has its result
    pub(crate) async fn read_fetched(&self) {
        self.fetched.notified().await
    }

    pub(crate) fn release(&self) {
        self.released.notify_one();
    }

    pub(crate) fn lists(&self) -> usize {
        self.inner.lists()
    }

    pub(crate) fn gets(&self) -> usize {
        self.inner.gets()
    }

    async fn hold(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.fetched.notify_one();
            self.released.notified().await;
        }
    }
}

#[async_trait]
impl CatalogStore for HeldStore {
    async fn insert(&self, doc: &EntryDocument) -> Result<EntryId> {
        self.inner.insert(doc).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<CatalogEntry>> {
        let entries = self.inner.list(query).await;
        self.hold().await;
        entries
    }

    async fn get(&self, id: &EntryId) -> Result<Option<CatalogEntry>> {
        let entry = self.inner.get(id).await;
        self.hold().await;
        entry
    }

    async fn update(&self, id: &EntryId, patch: &EntryPatch) -> Result<()> {
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &EntryId) -> Result<()> {
        self.inner.delete(id).await
    }
}
