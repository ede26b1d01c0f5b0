use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use portfolio_cache::{CachedPayload, DEFAULT_TTL, QueryKey, ResponseCache};
use portfolio_time::TimeProvider;
use portfolio_types::{
    CatalogEntry, Category, Cursor, EntryDocument, EntryDraft, EntryId, EntryPatch, Page,
};
use tracing::{debug, error, info, warn};

use crate::{
    Error, Result,
    store::{CatalogStore, ListQuery},
};

/// Reads and writes the catalog collection, answering repeat reads from a TTL cache
///
/// Every write clears the whole cache, so a read that follows a write always goes to the store.
#[derive(Debug)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    cache: ResponseCache,
    time_provider: Arc<dyn TimeProvider>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self::new_with_ttl(store, time_provider, DEFAULT_TTL)
    }

    pub fn new_with_ttl(
        store: Arc<dyn CatalogStore>,
        time_provider: Arc<dyn TimeProvider>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache: ResponseCache::new_with_ttl(Arc::clone(&time_provider), ttl),
            time_provider,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Validate `draft`, stamp it with the current time and persist it as a new entry
    pub async fn add(&self, draft: EntryDraft) -> Result<EntryId> {
        let draft = draft
            .validate()
            .inspect_err(|error| warn!(%error, "rejected new catalog entry"))?;
        let doc = EntryDocument::new(draft, self.time_provider.now());
        let result = self.store.insert(&doc).await;
        self.cache.clear();
        match &result {
            Ok(id) => info!(
                %id,
                name = %doc.draft.name,
                category = %doc.draft.category,
                "added catalog entry"
            ),
            Err(error) => error!(%error, name = %doc.draft.name, "failed to add catalog entry"),
        }
        result
    }

    /// Every entry in the collection
    pub async fn get_all(&self, use_cache: bool) -> Result<Arc<Vec<CatalogEntry>>> {
        self.listing(QueryKey::All, ListQuery::all(), use_cache).await
    }

    pub async fn get_by_category(
        &self,
        category: Category,
        use_cache: bool,
    ) -> Result<Arc<Vec<CatalogEntry>>> {
        self.listing(
            QueryKey::Category(category),
            ListQuery::category(category),
            use_cache,
        )
        .await
    }

    /// Look up one entry, failing with [`Error::NotFound`] if the id does not resolve
    pub async fn get_by_id(&self, id: &EntryId, use_cache: bool) -> Result<Arc<CatalogEntry>> {
        let key = QueryKey::Entry(id.clone());
        if let Some(entry) = self
            .cached(&key, use_cache)
            .and_then(CachedPayload::into_entry)
        {
            debug!(%id, "serving catalog entry from cache");
            return Ok(entry);
        }

        let generation = self.cache.generation();
        let entry = self
            .store
            .get(id)
            .await
            .inspect_err(|error| error!(%id, %error, "failed to fetch catalog entry"))?;
        let entry = match entry {
            Some(entry) if entry.id == *id => Arc::new(entry),
            Some(entry) => {
                let error = Error::malformed(format!(
                    "requested entry '{id}' but the store returned '{}'",
                    entry.id
                ));
                error!(%id, %error, "store answered with the wrong entry");
                return Err(error);
            }
            None => {
                warn!(%id, "catalog entry not found");
                return Err(Error::NotFound { id: id.clone() });
            }
        };
        self.cache
            .insert_if_unchanged(key, CachedPayload::Entry(Arc::clone(&entry)), generation);
        Ok(entry)
    }

    /// One page of the newest-first listing, optionally limited to `category`
    ///
    /// Without a `cursor` this is the first page, which is cached per `(category, page_size)`;
    /// `reset` drops that cached page first. Pages after a cursor are always fetched live.
    pub async fn get_paginated(
        &self,
        category: Option<Category>,
        page_size: NonZeroUsize,
        cursor: Option<&Cursor>,
        reset: bool,
    ) -> Result<Arc<Page>> {
        let key = QueryKey::FirstPage {
            category,
            page_size,
        };
        if reset && self.cache.remove(&key) {
            debug!(%key, "pagination reset");
        }

        if let Some(cursor) = cursor {
            let page = self
                .fetch_page(category, page_size, Some(cursor.clone()))
                .await?;
            return Ok(Arc::new(page));
        }

        if let Some(page) = self.cache.get(&key).and_then(CachedPayload::into_page) {
            debug!(%key, n_entries = page.len(), "serving first page from cache");
            return Ok(page);
        }
        let generation = self.cache.generation();
        let page = Arc::new(self.fetch_page(category, page_size, None).await?);
        self.cache
            .insert_if_unchanged(key, CachedPayload::Page(Arc::clone(&page)), generation);
        Ok(page)
    }

    /// Merge `patch` into an existing entry and bump its `updatedAt`
    pub async fn update(&self, id: &EntryId, patch: EntryPatch) -> Result<()> {
        let patch = patch
            .validate()
            .inspect_err(|error| warn!(%id, %error, "rejected catalog entry update"))?
            .with_updated_at(self.time_provider.now());
        let result = self.store.update(id, &patch).await;
        self.cache.clear();
        match &result {
            Ok(()) => info!(%id, "updated catalog entry"),
            Err(Error::NotFound { .. }) => warn!(%id, "cannot update missing catalog entry"),
            Err(error) => error!(%id, %error, "failed to update catalog entry"),
        }
        result
    }

    /// Remove an entry; removing one that does not exist succeeds
    pub async fn delete(&self, id: &EntryId) -> Result<()> {
        let result = self.store.delete(id).await;
        self.cache.clear();
        match &result {
            Ok(()) => info!(%id, "deleted catalog entry"),
            Err(error) => error!(%id, %error, "failed to delete catalog entry"),
        }
        result
    }

    /// Entries whose name, short description or tech stack contain `term`, ignoring case
    ///
    /// Filters the (cached) listing for `category`, or for the whole collection.
    pub async fn search(
        &self,
        category: Option<Category>,
        term: &str,
    ) -> Result<Vec<CatalogEntry>> {
        let listing = match category {
            Some(category) => self.get_by_category(category, true).await?,
            None => self.get_all(true).await?,
        };
        Ok(listing
            .iter()
            .filter(|entry| entry.matches_search(term))
            .cloned()
            .collect())
    }

    fn cached(&self, key: &QueryKey, use_cache: bool) -> Option<CachedPayload> {
        if use_cache {
            self.cache.get(key)
        } else {
            None
        }
    }

    async fn listing(
        &self,
        key: QueryKey,
        query: ListQuery,
        use_cache: bool,
    ) -> Result<Arc<Vec<CatalogEntry>>> {
        if let Some(entries) = self
            .cached(&key, use_cache)
            .and_then(CachedPayload::into_entries)
        {
            debug!(%key, n_entries = entries.len(), "serving listing from cache");
            return Ok(entries);
        }

        let generation = self.cache.generation();
        let entries = self
            .store
            .list(&query)
            .await
            .inspect_err(|error| error!(%key, %error, "failed to list catalog entries"))?;
        debug!(%key, n_entries = entries.len(), use_cache, "fetched listing");
        let entries = Arc::new(entries);
        self.cache
            .insert_if_unchanged(key, CachedPayload::Entries(Arc::clone(&entries)), generation);
        Ok(entries)
    }

    async fn fetch_page(
        &self,
        category: Option<Category>,
        page_size: NonZeroUsize,
        start_after: Option<Cursor>,
    ) -> Result<Page> {
        let mut entries = self
            .store
            .list(&ListQuery::page(category, page_size, start_after))
            .await
            .inspect_err(|error| {
                error!(?category, %page_size, %error, "failed to fetch catalog page")
            })?;
        entries.truncate(page_size.get());
        let page = Page::from_entries(entries, page_size);
        debug!(
            ?category,
            %page_size,
            n_entries = page.len(),
            has_more = page.has_more,
            "fetched catalog page"
        );
        Ok(page)
    }
}
