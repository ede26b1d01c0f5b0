use async_trait::async_trait;
use portfolio_client::Client;
use portfolio_types::{CatalogEntry, EntryDocument, EntryId, EntryPatch};
use tracing::debug;

use crate::{
    Error, Result,
    store::{CatalogStore, ListQuery},
};

/// A [`CatalogStore`] backed by one collection of the hosted document store
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Client,
    collection: String,
}

impl RemoteStore {
    pub fn new(client: Client, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl From<portfolio_client::Error> for Error {
    fn from(e: portfolio_client::Error) -> Self {
        if e.is_malformed_response() {
            Self::malformed(e)
        } else {
            Self::store(e)
        }
    }
}

#[async_trait]
impl CatalogStore for RemoteStore {
    async fn insert(&self, doc: &EntryDocument) -> Result<EntryId> {
        let id = self
            .client
            .api_v1_document_create(&self.collection, doc)
            .await?;
        if id.is_empty() {
            return Err(Error::malformed("store assigned an empty document id"));
        }
        Ok(EntryId::new(id))
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<CatalogEntry>> {
        let mut req = self.client.api_v1_documents_list(self.collection.as_str());
        if let Some(category) = query.category {
            req = req.category(category.as_str());
        }
        if query.newest_first || query.start_after.is_some() {
            req = req.order_by_created_at_desc();
        }
        if let Some(limit) = query.limit {
            req = req.limit(limit.get());
        }
        if let Some(cursor) = &query.start_after {
            req = req.start_after(cursor.id().as_str(), cursor.created_at().to_rfc3339());
        }
        let entries: Vec<CatalogEntry> = req.send().await?;
        debug!(
            collection = %self.collection,
            category = ?query.category,
            n_entries = entries.len(),
            "listed documents"
        );
        Ok(entries)
    }

    async fn get(&self, id: &EntryId) -> Result<Option<CatalogEntry>> {
        Ok(self
            .client
            .api_v1_document_get(&self.collection, id.as_str())
            .await?)
    }

    async fn update(&self, id: &EntryId, patch: &EntryPatch) -> Result<()> {
        self.client
            .api_v1_document_patch(&self.collection, id.as_str(), patch)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    Error::NotFound { id: id.clone() }
                } else {
                    e.into()
                }
            })
    }

    async fn delete(&self, id: &EntryId) -> Result<()> {
        Ok(self
            .client
            .api_v1_document_delete(&self.collection, id.as_str())
            .await?)
    }
}
