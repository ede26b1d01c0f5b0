use std::{path::PathBuf, str::FromStr, sync::Arc};

use portfolio_catalog::CatalogService;
use portfolio_clap_blocks::{ConfigError, cache::CacheConfig, store::StoreConfig};
use portfolio_ingest::ImageStorage;
use portfolio_time::SystemProvider;
use portfolio_types::ImageRef;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] portfolio_catalog::Error),

    #[error(transparent)]
    Image(#[from] portfolio_ingest::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("nothing to update, set at least one field")]
    NothingToUpdate,
}

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

/// Where the catalog lives and how reads are cached
#[derive(Debug, clap::Parser)]
pub(crate) struct CatalogConfig {
    #[clap(flatten)]
    store_config: StoreConfig,

    #[clap(flatten)]
    cache_config: CacheConfig,
}

impl CatalogConfig {
    pub(crate) fn make_service(&self) -> Result<CatalogService, ConfigError> {
        let store = self.store_config.make_store()?;
        Ok(CatalogService::new_with_ttl(
            store,
            Arc::new(SystemProvider::new()),
            self.cache_config.cache_ttl,
        ))
    }
}

/// Store every file in `paths`, in order
pub(crate) async fn store_images(
    storage: &ImageStorage,
    paths: &[PathBuf],
) -> Result<Vec<ImageRef>> {
    debug!(n_images = paths.len(), "storing images");
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        images.push(storage.store_file(path).await?);
    }
    Ok(images)
}

/// Print `value` to stdout as pretty JSON
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A clap argument provided as a list of items separated by `SEPARATOR`, which by default is a ','
#[derive(Debug, Clone)]
pub(crate) struct SeparatedList<T, const SEPARATOR: char = ','>(pub(crate) Vec<T>);

impl<T, const SEPARATOR: char> FromStr for SeparatedList<T, SEPARATOR>
where
    T: FromStr<Err: Into<anyhow::Error>>,
{
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(
            s.split(SEPARATOR)
                .map(|s| s.parse::<T>().map_err(Into::into))
                .collect::<Result<Vec<T>, Self::Err>>()?,
        ))
    }
}

impl<T, const SEPARATOR: char> IntoIterator for SeparatedList<T, SEPARATOR> {
    type Item = T;

    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
