use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use portfolio_types::{CatalogEntry, EntryDocument, EntryId, EntryPatch, newest_first};
use tracing::trace;
use uuid::Uuid;

use crate::{
    Error, Result,
    store::{CatalogStore, ListQuery},
};

/// A [`CatalogStore`] that keeps the collection in process memory
///
/// Ids are random and never reused. Unordered listings come back in id order, the way a
/// document store lists a collection by key.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: RwLock<BTreeMap<EntryId, CatalogEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert(&self, doc: &EntryDocument) -> Result<EntryId> {
        let mut documents = self.documents.write();
        let id = loop {
            let id = EntryId::new(Uuid::new_v4().simple().to_string());
            if !documents.contains_key(&id) {
                break id;
            }
        };
        trace!(%id, "inserting document");
        documents.insert(id.clone(), CatalogEntry::from_document(id.clone(), doc.clone()));
        Ok(id)
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<CatalogEntry>> {
        let documents = self.documents.read();
        let mut entries: Vec<_> = documents
            .values()
            .filter(|e| query.category.is_none_or(|c| e.category == c))
            .cloned()
            .collect();
        if query.newest_first || query.start_after.is_some() {
            entries.sort_by(newest_first);
        }
        if let Some(cursor) = &query.start_after {
            entries.retain(|e| cursor.precedes(e));
        }
        if let Some(limit) = query.limit {
            entries.truncate(limit.get());
        }
        Ok(entries)
    }

    async fn get(&self, id: &EntryId) -> Result<Option<CatalogEntry>> {
        Ok(self.documents.read().get(id).cloned())
    }

    async fn update(&self, id: &EntryId, patch: &EntryPatch) -> Result<()> {
        let mut documents = self.documents.write();
        let entry = documents
            .get_mut(id)
            .ok_or_else(|| Error::NotFound { id: id.clone() })?;
        entry.apply_patch(patch);
        Ok(())
    }

    async fn delete(&self, id: &EntryId) -> Result<()> {
        self.documents.write().remove(id);
        Ok(())
    }
}
