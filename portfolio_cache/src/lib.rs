//! In-process cache of catalog query results.
//!
//! Results are keyed by the query that produced them and expire after a fixed TTL. There is
//! no size bound and no eviction besides expiry and [`ResponseCache::clear`]: callers clear
//! the whole cache on every write, so the map only ever holds the handful of listings and
//! lookups a session has made since the last write. Each clear starts a new generation, and
//! [`ResponseCache::insert_if_unchanged`] refuses results fetched in an older one.

use std::{collections::HashMap, num::NonZeroUsize, sync::Arc, time::Duration};

use parking_lot::RwLock;
use portfolio_time::{Time, TimeProvider};
use portfolio_types::{CatalogEntry, Category, EntryId, Page};
use tracing::{debug, trace};

/// How long a cached result stays valid unless configured otherwise
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// The query a cached result answers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Every entry in the collection
    All,
    /// Entries in one category
    Category(Category),
    /// A single entry looked up by id
    Entry(EntryId),
    /// The first page of a paginated listing; later pages are never cached
    FirstPage {
        category: Option<Category>,
        page_size: NonZeroUsize,
    },
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Category(c) => write!(f, "category:{c}"),
            Self::Entry(id) => write!(f, "entry:{id}"),
            Self::FirstPage {
                category: Some(c),
                page_size,
            } => write!(f, "first_page:{c}:{page_size}"),
            Self::FirstPage {
                category: None,
                page_size,
            } => write!(f, "first_page:all:{page_size}"),
        }
    }
}

/// A cached result, shared so that hits hand out the stored value without copying it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedPayload {
    Entries(Arc<Vec<CatalogEntry>>),
    Entry(Arc<CatalogEntry>),
    Page(Arc<Page>),
}

impl CachedPayload {
    pub fn into_entries(self) -> Option<Arc<Vec<CatalogEntry>>> {
        match self {
            Self::Entries(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_entry(self) -> Option<Arc<CatalogEntry>> {
        match self {
            Self::Entry(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_page(self) -> Option<Arc<Page>> {
        match self {
            Self::Page(p) => Some(p),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    payload: CachedPayload,
    fetched_at: Time,
}

impl CacheEntry {
    /// A clock that has stepped backwards yields no age; such entries count as fresh
    fn is_valid(&self, now: Time, ttl: Duration) -> bool {
        now.checked_duration_since(self.fetched_at)
            .is_none_or(|age| age < ttl)
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<QueryKey, CacheEntry>,
    /// Bumped by every [`ResponseCache::clear`]
    generation: u64,
}

/// Maps a [`QueryKey`] to the result fetched for it and the time it was fetched
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    time_provider: Arc<dyn TimeProvider>,
    state: RwLock<CacheState>,
}

impl ResponseCache {
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self::new_with_ttl(time_provider, DEFAULT_TTL)
    }

    pub fn new_with_ttl(time_provider: Arc<dyn TimeProvider>, ttl: Duration) -> Self {
        Self {
            ttl,
            time_provider,
            state: Default::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a result, treating anything at or beyond the TTL as a miss
    ///
    /// Expired values are dropped on the way out.
    pub fn get(&self, key: &QueryKey) -> Option<CachedPayload> {
        let now = self.time_provider.now();
        {
            let read = self.state.read();
            match read.entries.get(key) {
                None => {
                    trace!(%key, "cache miss");
                    return None;
                }
                Some(entry) if entry.is_valid(now, self.ttl) => {
                    trace!(%key, fetched_at = %entry.fetched_at, "cache hit");
                    return Some(entry.payload.clone());
                }
                Some(_) => {}
            }
        }
        let mut write = self.state.write();
        if write
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_valid(now, self.ttl))
        {
            debug!(%key, "dropping expired cache entry");
            write.entries.remove(key);
        }
        None
    }

    /// Store a freshly fetched result, stamped with the current time
    pub fn insert(&self, key: QueryKey, payload: CachedPayload) {
        let fetched_at = self.time_provider.now();
        trace!(%key, %fetched_at, "caching result");
        self.state
            .write()
            .entries
            .insert(key, CacheEntry { payload, fetched_at });
    }

    /// The current generation; compare against it with [`Self::insert_if_unchanged`]
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Store a result only if the cache has not been cleared since `generation` was read
    ///
    /// A fetch that raced with a write would otherwise put pre-write data back into the
    /// cache. Returns whether the result was stored.
    pub fn insert_if_unchanged(
        &self,
        key: QueryKey,
        payload: CachedPayload,
        generation: u64,
    ) -> bool {
        let fetched_at = self.time_provider.now();
        let mut write = self.state.write();
        if write.generation != generation {
            debug!(
                %key,
                generation,
                current = write.generation,
                "discarding result fetched before a clear"
            );
            return false;
        }
        trace!(%key, %fetched_at, "caching result");
        write.entries.insert(key, CacheEntry { payload, fetched_at });
        true
    }

    /// Drop a single key, returning whether it was present
    pub fn remove(&self, key: &QueryKey) -> bool {
        self.state.write().entries.remove(key).is_some()
    }

    /// Drop every cached result
    pub fn clear(&self) {
        let mut write = self.state.write();
        if !write.entries.is_empty() {
            debug!(n_entries = write.entries.len(), "clearing response cache");
        }
        write.entries.clear();
        write.generation += 1;
    }

    /// Number of stored results, including any that have expired but not yet been read
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }
}
