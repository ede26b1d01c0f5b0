use portfolio_types::EntryId;

use super::common::{CatalogConfig, Result};

#[derive(Debug, clap::Parser)]
pub(crate) struct Config {
    #[clap(flatten)]
    catalog_config: CatalogConfig,

    /// Id of the entry to delete
    ///
    /// Deleting an id that does not exist succeeds.
    #[clap(action)]
    id: EntryId,
}

pub(crate) async fn command(config: Config) -> Result<()> {
    let service = config.catalog_config.make_service()?;
    service.delete(&config.id).await?;
    println!("Entry \"{}\" deleted successfully", config.id);
    Ok(())
}
