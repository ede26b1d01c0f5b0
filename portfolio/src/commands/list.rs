use portfolio_types::Category;

use super::common::{CatalogConfig, Result, print_json};

#[derive(Debug, clap::Parser)]
#[clap(visible_alias = "ls")]
pub(crate) struct Config {
    #[clap(flatten)]
    catalog_config: CatalogConfig,

    /// Only list entries in this category
    ///
    /// One of python, iot, mern, java, app or game.
    #[clap(short = 'c', long = "category")]
    category: Option<Category>,

    /// Only list entries whose name, short description or tech stack contain this text
    ///
    /// Matching ignores case.
    #[clap(short = 's', long = "search")]
    search: Option<String>,
}

pub(crate) async fn command(config: Config) -> Result<()> {
    let service = config.catalog_config.make_service()?;

    match (config.search, config.category) {
        (Some(term), category) => print_json(&service.search(category, &term).await?),
        (None, Some(category)) => print_json(&*service.get_by_category(category, true).await?),
        (None, None) => print_json(&*service.get_all(true).await?),
    }
}
