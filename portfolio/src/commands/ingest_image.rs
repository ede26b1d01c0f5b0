use std::path::PathBuf;

use portfolio_clap_blocks::image::ImageConfig;
use portfolio_types::ImageRef;
use serde::Serialize;

use super::common::{Result, print_json, store_images};

#[derive(Debug, clap::Parser)]
pub(crate) struct Config {
    #[clap(flatten)]
    image_config: ImageConfig,

    /// Image files to ingest
    #[clap(required = true, num_args = 1..)]
    paths: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Ingested<'a> {
    path: &'a PathBuf,
    image: &'a ImageRef,
}

pub(crate) async fn command(config: Config) -> Result<()> {
    let storage = config.image_config.make_storage()?;
    let images = store_images(&storage, &config.paths).await?;
    let ingested: Vec<_> = config
        .paths
        .iter()
        .zip(&images)
        .map(|(path, image)| Ingested { path, image })
        .collect();
    print_json(&ingested)
}
