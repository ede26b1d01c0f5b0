use std::path::PathBuf;

use portfolio_clap_blocks::image::ImageConfig;
use portfolio_types::{Category, Difficulty, EntryDraft};

use super::common::{CatalogConfig, Result, SeparatedList, print_json, store_images};

#[derive(Debug, clap::Parser)]
pub(crate) struct Config {
    #[clap(flatten)]
    catalog_config: CatalogConfig,

    #[clap(flatten)]
    image_config: ImageConfig,

    /// Project name
    #[clap(long = "name")]
    name: String,

    /// One line summary shown on the project card
    #[clap(long = "short-description")]
    short_description: String,

    /// Full write-up shown on the project page
    #[clap(long = "detailed-description")]
    detailed_description: String,

    /// One of python, iot, mern, java, app or game
    #[clap(short = 'c', long = "category")]
    category: Category,

    /// Comma separated list of technologies, e.g. `Rust,Tokio,Postgres`
    #[clap(long = "tech")]
    tech_stack: Option<SeparatedList<String>>,

    /// A feature of the project; repeat for more
    #[clap(long = "feature")]
    features: Vec<String>,

    /// Path of an image file to attach; repeat for more
    ///
    /// Images are processed according to `--image-storage`.
    #[clap(long = "image")]
    images: Vec<PathBuf>,

    /// Link to a demo video
    #[clap(long = "youtube")]
    youtube_video: Option<String>,

    /// Free text describing when the project was built
    #[clap(long = "timeline")]
    timeline: Option<String>,

    /// One of beginner, intermediate or advanced
    #[clap(long = "difficulty", default_value = "beginner")]
    difficulty: Difficulty,
}

pub(crate) async fn command(config: Config) -> Result<()> {
    let draft = EntryDraft {
        name: config.name,
        short_description: config.short_description,
        detailed_description: config.detailed_description,
        category: config.category,
        tech_stack: config.tech_stack.map(|t| t.0).unwrap_or_default(),
        features: config.features,
        images: vec![],
        youtube_video: config.youtube_video,
        timeline: config.timeline,
        difficulty: config.difficulty,
    };
    // nothing is uploaded for an entry that cannot be saved
    let mut draft = draft.validate().map_err(portfolio_catalog::Error::from)?;
    let service = config.catalog_config.make_service()?;
    let storage = config.image_config.make_storage()?;
    draft.images = store_images(&storage, &config.images).await?;

    let id = service.add(draft).await?;
    let entry = service.get_by_id(&id, true).await?;
    print_json(&*entry)
}
