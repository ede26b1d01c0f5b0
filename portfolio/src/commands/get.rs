use portfolio_types::EntryId;

use super::common::{CatalogConfig, Result, print_json};

#[derive(Debug, clap::Parser)]
pub(crate) struct Config {
    #[clap(flatten)]
    catalog_config: CatalogConfig,

    /// Id of the entry to show
    #[clap(action)]
    id: EntryId,
}

pub(crate) async fn command(config: Config) -> Result<()> {
    let service = config.catalog_config.make_service()?;
    let entry = service.get_by_id(&config.id, true).await?;
    print_json(&*entry)
}
