use std::num::NonZeroUsize;

use portfolio_types::{Category, Cursor};

use super::common::{CatalogConfig, Result, print_json};

#[derive(Debug, clap::Parser)]
pub(crate) struct Config {
    #[clap(flatten)]
    catalog_config: CatalogConfig,

    /// Only page through entries in this category
    #[clap(short = 'c', long = "category")]
    category: Option<Category>,

    /// Number of entries per page
    #[clap(long = "page-size", default_value = "6")]
    page_size: NonZeroUsize,

    /// Resume after the entry this cursor points at
    ///
    /// Pass the `cursor` field of the previous page. Without it the first page is returned.
    #[clap(long = "cursor")]
    cursor: Option<Cursor>,

    /// Drop any cached first page before fetching
    #[clap(long = "reset", action)]
    reset: bool,
}

pub(crate) async fn command(config: Config) -> Result<()> {
    let service = config.catalog_config.make_service()?;
    let page = service
        .get_paginated(
            config.category,
            config.page_size,
            config.cursor.as_ref(),
            config.reset,
        )
        .await?;
    print_json(&*page)
}
