use std::path::PathBuf;

use portfolio_clap_blocks::image::ImageConfig;
use portfolio_types::{Category, Difficulty, EntryId, EntryPatch};

use super::common::{
    CatalogConfig, Error, Result, SeparatedList, print_json, store_images,
};

#[derive(Debug, clap::Parser)]
pub(crate) struct Config {
    #[clap(flatten)]
    catalog_config: CatalogConfig,

    #[clap(flatten)]
    image_config: ImageConfig,

    /// Id of the entry to update
    #[clap(action)]
    id: EntryId,

    /// New project name
    #[clap(long = "name")]
    name: Option<String>,

    /// New one line summary
    #[clap(long = "short-description")]
    short_description: Option<String>,

    /// New full write-up
    #[clap(long = "detailed-description")]
    detailed_description: Option<String>,

    /// Move the entry to another category
    #[clap(short = 'c', long = "category")]
    category: Option<Category>,

    /// Replace the tech stack with this comma separated list
    #[clap(long = "tech")]
    tech_stack: Option<SeparatedList<String>>,

    /// Replace the features; repeat for more
    #[clap(long = "feature")]
    features: Vec<String>,

    /// Replace the images with these files; repeat for more
    #[clap(long = "image")]
    images: Vec<PathBuf>,

    /// New demo video link; an empty value removes it
    #[clap(long = "youtube")]
    youtube_video: Option<String>,

    /// New timeline; an empty value removes it
    #[clap(long = "timeline")]
    timeline: Option<String>,

    /// One of beginner, intermediate or advanced
    #[clap(long = "difficulty")]
    difficulty: Option<Difficulty>,
}

pub(crate) async fn command(config: Config) -> Result<()> {
    let mut patch = EntryPatch {
        name: config.name,
        short_description: config.short_description,
        detailed_description: config.detailed_description,
        category: config.category,
        tech_stack: config.tech_stack.map(|t| t.0),
        features: (!config.features.is_empty()).then_some(config.features),
        images: None,
        youtube_video: config.youtube_video.map(Some),
        timeline: config.timeline.map(Some),
        difficulty: config.difficulty,
        updated_at: None,
    };
    if patch.is_empty() && config.images.is_empty() {
        return Err(Error::NothingToUpdate);
    }
    patch = patch.validate().map_err(portfolio_catalog::Error::from)?;

    // nothing is uploaded until the store is reachable and the entry exists
    let service = config.catalog_config.make_service()?;
    if !config.images.is_empty() {
        let storage = config.image_config.make_storage()?;
        service.get_by_id(&config.id, false).await?;
        patch.images = Some(store_images(&storage, &config.images).await?);
    }

    service.update(&config.id, patch).await?;
    let entry = service.get_by_id(&config.id, true).await?;
    print_json(&*entry)
}
