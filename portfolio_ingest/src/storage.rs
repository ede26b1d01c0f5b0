use std::path::Path;

use portfolio_client::{Client, image_host::ImageHostClient};
use portfolio_types::ImageRef;
use tracing::{error, info, warn};

use crate::{Error, ImageIngester, Result, encode_data_url, read_file};

/// Where ingested images end up
#[derive(Debug, Clone)]
pub enum ImageStorage {
    /// Compressed and embedded in the entry itself
    Inline(ImageIngester),
    /// Embedded in the entry as-is, without scaling or re-encoding
    Raw,
    /// Uploaded as-is to the blob store under `prefix`
    Blob { client: Client, prefix: String },
    /// Uploaded as-is to the hosted image service
    Hosted(ImageHostClient),
}

impl ImageStorage {
    /// Store the image at `path` and return the reference to put on a catalog entry
    pub async fn store_file(&self, path: impl AsRef<Path>) -> Result<ImageRef> {
        let path = path.as_ref();
        match self {
            Self::Inline(ingester) => ingester.ingest_file(path).await,
            Self::Raw => {
                let Upload { name, bytes, .. } = Upload::read(path).await?;
                info!(%name, n_bytes = bytes.len(), "embedding image unchanged");
                encode_data_url(&bytes)
            }
            Self::Blob { client, prefix } => {
                let Upload {
                    name,
                    content_type,
                    bytes,
                } = Upload::read(path).await?;
                let result = client
                    .api_v1_blob_put(&blob_path(prefix, &name), content_type, bytes)
                    .await;
                uploaded(name, result)
            }
            Self::Hosted(host) => {
                let Upload {
                    name,
                    content_type,
                    bytes,
                } = Upload::read(path).await?;
                let result = host.upload(name.clone(), content_type, bytes).await;
                uploaded(name, result)
            }
        }
    }
}

fn uploaded(name: String, result: portfolio_client::Result<String>) -> Result<ImageRef> {
    match result {
        Ok(url) => {
            info!(%name, %url, "uploaded image");
            Ok(ImageRef::External(url))
        }
        Err(source) => {
            error!(%name, error = %source, "failed to upload image");
            Err(Error::Upload { name, source })
        }
    }
}

/// A file read off disk and checked to be an image
#[derive(Debug)]
struct Upload {
    name: String,
    content_type: &'static str,
    bytes: Vec<u8>,
}

impl Upload {
    async fn read(path: &Path) -> Result<Self> {
        Self::read_image(path).await.inspect_err(
            |error| warn!(path = %path.display(), %error, "failed to read image for upload"),
        )
    }

    async fn read_image(path: &Path) -> Result<Self> {
        let bytes = read_file(path).await?;
        let format = image::guess_format(&bytes).map_err(Error::Decode)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self {
            name,
            content_type: format.to_mime_type(),
            bytes,
        })
    }
}

fn blob_path(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}
