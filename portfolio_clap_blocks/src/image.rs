//! CLI handling for image ingestion config.

use std::num::NonZeroU32;

use portfolio_client::{Client, image_host::ImageHostClient};
use portfolio_ingest::{DEFAULT_QUALITY, ImageIngester, ImageStorage};
use secrecy::{ExposeSecret, Secret};
use tracing::info;
use url::Url;

use crate::ConfigError;

/// Image storage type.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ImageStorageType {
    /// Compress and embed images in the catalog entry as data URLs.
    #[default]
    Inline,

    /// Embed images in the catalog entry as data URLs, unchanged.
    Raw,

    /// Upload images to the blob store and reference them by URL.
    Blob,

    /// Upload images to the hosted image service and reference them by URL.
    Hosted,
}

impl ImageStorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Raw => "raw",
            Self::Blob => "blob",
            Self::Hosted => "hosted",
        }
    }
}

/// A `clap` `value_parser` for a JPEG quality given as a fraction in `(0, 1]`.
fn parse_quality(s: &str) -> Result<f32, String> {
    let quality: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if quality > 0.0 && quality <= 1.0 {
        Ok(quality)
    } else {
        Err(format!("quality must be in (0, 1], got {quality}"))
    }
}

/// How images attached to catalog entries are processed and stored
#[derive(Debug, Clone, clap::Parser)]
pub struct ImageConfig {
    /// Where ingested images are kept.
    ///
    /// Possible values (case insensitive):
    ///
    /// * inline (default): compressed to JPEG and embedded in the entry.
    /// * raw: embedded in the entry unchanged, in its original format.
    /// * blob: uploaded unchanged to the blob store. Must also set `--blob-url`.
    /// * hosted: uploaded unchanged to the hosted image service. Must also set
    ///   `--image-host-url`, `--image-cloud-name` and `--image-upload-preset`.
    #[clap(
        value_enum,
        long = "image-storage",
        env = "PORTFOLIO_IMAGE_STORAGE",
        default_value = "inline",
        ignore_case = true,
        action,
        verbatim_doc_comment
    )]
    pub image_storage: ImageStorageType,

    /// Images wider or taller than this many pixels are scaled down before embedding.
    #[clap(
        long = "image-max-width",
        env = "PORTFOLIO_IMAGE_MAX_WIDTH",
        default_value = "800",
        action
    )]
    pub max_width: NonZeroU32,

    /// JPEG quality of embedded images, as a fraction in (0, 1].
    #[clap(
        long = "image-quality",
        env = "PORTFOLIO_IMAGE_QUALITY",
        default_value_t = DEFAULT_QUALITY,
        value_parser = parse_quality
    )]
    pub quality: f32,

    /// Base URL of the blob store.
    #[clap(long = "blob-url", env = "PORTFOLIO_BLOB_URL", action)]
    pub blob_url: Option<Url>,

    /// Path prefix under which images are uploaded to the blob store.
    #[clap(
        long = "blob-prefix",
        env = "PORTFOLIO_BLOB_PREFIX",
        default_value = "projects",
        action
    )]
    pub blob_prefix: String,

    /// Bearer token for the blob store.
    #[clap(long = "blob-token", env = "PORTFOLIO_BLOB_TOKEN", action)]
    pub blob_token: Option<Secret<String>>,

    /// Base URL of the hosted image service.
    #[clap(long = "image-host-url", env = "PORTFOLIO_IMAGE_HOST_URL", action)]
    pub image_host_url: Option<Url>,

    /// Account (cloud) name on the hosted image service.
    #[clap(long = "image-cloud-name", env = "PORTFOLIO_IMAGE_CLOUD_NAME", action)]
    pub cloud_name: Option<String>,

    /// Unsigned upload preset on the hosted image service.
    #[clap(
        long = "image-upload-preset",
        env = "PORTFOLIO_IMAGE_UPLOAD_PRESET",
        action
    )]
    pub upload_preset: Option<Secret<String>>,
}

impl ImageConfig {
    pub fn ingester(&self) -> ImageIngester {
        ImageIngester::new(self.max_width, self.quality)
    }

    /// Create the configured image storage.
    pub fn make_storage(&self) -> Result<ImageStorage, ConfigError> {
        let missing = |missing| ConfigError::MissingConfig {
            setting: "image-storage",
            value: self.image_storage.as_str(),
            missing,
        };

        let storage = match self.image_storage {
            ImageStorageType::Inline => {
                let ingester = self.ingester();
                info!(
                    storage_type = self.image_storage.as_str(),
                    max_width = ingester.max_width(),
                    quality = ingester.quality(),
                    "image storage"
                );
                ImageStorage::Inline(ingester)
            }
            ImageStorageType::Raw => {
                info!(storage_type = self.image_storage.as_str(), "image storage");
                ImageStorage::Raw
            }
            ImageStorageType::Blob => {
                let url = self.blob_url.as_ref().ok_or_else(|| missing("blob-url"))?;
                let mut client = Client::new(url.clone())?;
                if let Some(token) = &self.blob_token {
                    client = client.with_auth_token(token.expose_secret());
                }
                info!(
                    storage_type = self.image_storage.as_str(),
                    %url,
                    prefix = %self.blob_prefix,
                    "image storage"
                );
                ImageStorage::Blob {
                    client,
                    prefix: self.blob_prefix.clone(),
                }
            }
            ImageStorageType::Hosted => {
                let url = self
                    .image_host_url
                    .as_ref()
                    .ok_or_else(|| missing("image-host-url"))?;
                let cloud_name = self
                    .cloud_name
                    .as_ref()
                    .ok_or_else(|| missing("image-cloud-name"))?;
                let preset = self
                    .upload_preset
                    .as_ref()
                    .ok_or_else(|| missing("image-upload-preset"))?;
                info!(
                    storage_type = self.image_storage.as_str(),
                    %url,
                    %cloud_name,
                    "image storage"
                );
                ImageStorage::Hosted(ImageHostClient::new(
                    url.clone(),
                    cloud_name.as_str(),
                    preset.expose_secret().as_str(),
                )?)
            }
        };
        Ok(storage)
    }
}
