//! Data access for the portfolio catalog.
//!
//! [`CatalogService`] is the one entry point the presentation layer talks to. It answers reads
//! out of a [`ResponseCache`](portfolio_cache::ResponseCache) while results are fresh, sends
//! everything else to a [`CatalogStore`], and clears the cache on every write.

mod memory;
mod remote;
mod service;
mod store;

#[cfg(test)]
mod test_helpers;

pub use memory::InMemoryStore;
pub use remote::RemoteStore;
pub use service::CatalogService;
pub use store::{CatalogStore, ListQuery};

use portfolio_types::{EntryId, ValidationError};

/// Boxed source of a store failure
pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("catalog entry '{id}' not found")]
    NotFound { id: EntryId },

    #[error("invalid catalog entry: {0}")]
    Validation(#[from] ValidationError),

    #[error("catalog store returned a malformed document: {source}")]
    MalformedDocument {
        #[source]
        source: DynError,
    },

    #[error("catalog store request failed: {source}")]
    Store {
        #[source]
        source: DynError,
    },
}

impl Error {
    pub fn store(source: impl Into<DynError>) -> Self {
        Self::Store {
            source: source.into(),
        }
    }

    pub fn malformed(source: impl Into<DynError>) -> Self {
        Self::MalformedDocument {
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
