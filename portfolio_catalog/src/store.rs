use std::{fmt::Debug, num::NonZeroUsize};

use async_trait::async_trait;
use portfolio_types::{CatalogEntry, Category, Cursor, EntryDocument, EntryId, EntryPatch};

use crate::Result;

/// Parameters of a listing read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Only return entries in this category
    pub category: Option<Category>,
    /// Order by `createdAt` then id, both descending; otherwise the store's natural order
    pub newest_first: bool,
    pub limit: Option<NonZeroUsize>,
    /// Only return entries that sort after this position; implies `newest_first`
    pub start_after: Option<Cursor>,
}

impl ListQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Default::default()
        }
    }

    /// One page of the newest-first listing
    pub fn page(
        category: Option<Category>,
        page_size: NonZeroUsize,
        start_after: Option<Cursor>,
    ) -> Self {
        Self {
            category,
            newest_first: true,
            limit: Some(page_size),
            start_after,
        }
    }
}

/// A document store holding the catalog collection
///
/// Implementations do no caching of their own.
#[async_trait]
pub trait CatalogStore: Debug + Send + Sync + 'static {
    /// Persist a new document, returning the id the store assigned to it
    async fn insert(&self, doc: &EntryDocument) -> Result<EntryId>;

    async fn list(&self, query: &ListQuery) -> Result<Vec<CatalogEntry>>;

    /// Fetch one entry, `None` if the id does not resolve
    async fn get(&self, id: &EntryId) -> Result<Option<CatalogEntry>>;

    /// Merge `patch` into an existing entry, failing with
    /// [`Error::NotFound`](crate::Error::NotFound) if there is none
    async fn update(&self, id: &EntryId, patch: &EntryPatch) -> Result<()>;

    /// Remove an entry; removing an absent id succeeds
    async fn delete(&self, id: &EntryId) -> Result<()>;
}
