//! CLI handling for catalog store config (via CLI arguments and environment variables).

use std::sync::Arc;

use portfolio_catalog::{CatalogStore, InMemoryStore, RemoteStore};
use portfolio_client::Client;
use secrecy::{ExposeSecret, Secret};
use tracing::info;
use url::Url;

use crate::ConfigError;

/// Catalog store type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum StoreType {
    /// The hosted document store at `--store-url`.
    Remote,

    /// In-memory, lost when the process exits.
    Memory,
}

impl StoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Memory => "memory",
        }
    }
}

/// Where the catalog collection lives
#[derive(Debug, Clone, clap::Parser)]
pub struct StoreConfig {
    /// Which document store holds the catalog.
    ///
    /// Possible values (case insensitive):
    ///
    /// * remote (default): the hosted document store. Must also set `--store-url`.
    /// * memory: an empty in-process store, useful for trying the CLI out.
    #[clap(
        value_enum,
        long = "store",
        env = "PORTFOLIO_STORE",
        default_value = "remote",
        ignore_case = true,
        action,
        verbatim_doc_comment
    )]
    pub store: StoreType,

    /// Base URL of the hosted document store.
    #[clap(long = "store-url", env = "PORTFOLIO_STORE_URL", action)]
    pub store_url: Option<Url>,

    /// Name of the collection that holds the catalog entries.
    #[clap(
        long = "collection",
        env = "PORTFOLIO_COLLECTION",
        default_value = "projects",
        action
    )]
    pub collection: String,

    /// Bearer token sent with every request to the document store.
    ///
    /// Prefer the environment variable over the command line flag in shared environments.
    #[clap(long = "store-token", env = "PORTFOLIO_STORE_TOKEN", action)]
    pub store_token: Option<Secret<String>>,
}

impl StoreConfig {
    /// Create the configured catalog store.
    pub fn make_store(&self) -> Result<Arc<dyn CatalogStore>, ConfigError> {
        match self.store {
            StoreType::Memory => {
                info!(store_type = self.store.as_str(), "catalog store");
                Ok(Arc::new(InMemoryStore::new()))
            }
            StoreType::Remote => {
                let url = self
                    .store_url
                    .as_ref()
                    .ok_or(ConfigError::MissingConfig {
                        setting: "store",
                        value: "remote",
                        missing: "store-url",
                    })?;
                let mut client = Client::new(url.clone())?;
                if let Some(token) = &self.store_token {
                    client = client.with_auth_token(token.expose_secret());
                }
                info!(
                    store_type = self.store.as_str(),
                    %url,
                    collection = %self.collection,
                    "catalog store"
                );
                Ok(Arc::new(RemoteStore::new(client, self.collection.as_str())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults() {
        let config =
            StoreConfig::try_parse_from(["portfolio", "--store-url", "http://localhost:9099"])
                .unwrap();
        assert_eq!(config.store, StoreType::Remote);
        assert_eq!(config.collection, "projects");
        assert_eq!(
            config.store_url.as_ref().map(Url::as_str),
            Some("http://localhost:9099/")
        );
    }

    #[test]
    fn store_type_ignores_case() {
        let config = StoreConfig::try_parse_from(["portfolio", "--store", "MEMORY"]).unwrap();
        assert_eq!(config.store, StoreType::Memory);
        assert!(StoreConfig::try_parse_from(["portfolio", "--store", "sqlite"]).is_err());
    }

    #[test]
    fn token_is_redacted() {
        let config = StoreConfig::try_parse_from([
            "portfolio",
            "--store-url",
            "http://localhost:9099",
            "--store-token",
            "hunter2",
        ])
        .unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
        assert_eq!(
            config.store_token.as_ref().map(|t| t.expose_secret().as_str()),
            Some("hunter2")
        );
        config.make_store().unwrap();
    }

    #[test]
    fn remote_requires_url() {
        let mut config = StoreConfig::try_parse_from(["portfolio"]).unwrap();
        // clean out eventual leaks via env variables
        config.store_url = None;

        let err = config.make_store().unwrap_err().to_string();
        assert_eq!(err, "--store=remote requires --store-url to be set");
    }

    #[test]
    fn memory_store() {
        let config = StoreConfig::try_parse_from(["portfolio", "--store", "memory"]).unwrap();
        let store = config.make_store().unwrap();
        assert!(format!("{store:?}").contains("InMemoryStore"));
    }
}
