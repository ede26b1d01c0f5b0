//! Turns image files into [`ImageRef`]s that a catalog entry can carry.
//!
//! Images are either embedded in the entry as data URLs, compressed to JPEG by
//! [`ImageIngester`] or kept as-is by [`encode_data_url`], or uploaded somewhere and
//! referenced by URL. [`ImageStorage`] picks between them.

mod storage;
pub use storage::ImageStorage;

#[cfg(test)]
mod test_helpers;

use std::{
    num::NonZeroU32,
    path::{Path, PathBuf},
};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{ColorType, DynamicImage, codecs::jpeg::JpegEncoder, imageops::FilterType};
use portfolio_types::ImageRef;
use tracing::{debug, info, warn};

/// Widest image, in pixels, that is embedded without scaling
pub const DEFAULT_MAX_WIDTH: u32 = 800;

/// JPEG quality used for embedded images, as a fraction
pub const DEFAULT_QUALITY: f32 = 0.8;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read image file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image as JPEG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("failed to upload image '{name}': {source}")]
    Upload {
        name: String,
        #[source]
        source: portfolio_client::Error,
    },

    #[error("image processing task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Compresses image files into embeddable JPEG data URLs
///
/// Images wider or taller than `max_width` are scaled down to fit, keeping their aspect ratio.
/// Smaller images keep their size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageIngester {
    max_width: u32,
    /// JPEG quality on the encoder's 1-100 scale
    quality: u8,
}

impl Default for ImageIngester {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            quality: jpeg_quality(DEFAULT_QUALITY),
        }
    }
}

impl ImageIngester {
    /// `quality` is a fraction in `(0, 1]`; values outside it are clamped
    pub fn new(max_width: NonZeroU32, quality: f32) -> Self {
        Self {
            max_width: max_width.get(),
            quality: jpeg_quality(quality),
        }
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Read, scale and re-encode the image at `path`, returning it as an embedded data URL
    ///
    /// Decoding and encoding run on the blocking thread pool.
    pub async fn ingest_file(&self, path: impl AsRef<Path>) -> Result<ImageRef> {
        let path = path.as_ref();
        self.ingest(path)
            .await
            .inspect_err(|error| warn!(path = %path.display(), %error, "failed to ingest image"))
    }

    async fn ingest(&self, path: &Path) -> Result<ImageRef> {
        let bytes = read_file(path).await?;
        let original_bytes = bytes.len();

        let ingester = *self;
        let jpeg = tokio::task::spawn_blocking(move || ingester.compress(&bytes)).await??;
        info!(
            path = %path.display(),
            original_bytes,
            compressed_bytes = jpeg.len(),
            "compressed image for embedding"
        );
        Ok(ImageRef::Embedded(data_url(mime::IMAGE_JPEG.as_ref(), &jpeg)))
    }

    /// Decode `bytes`, scale the bitmap to fit and encode it as JPEG
    pub fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let img = image::load_from_memory(bytes).map_err(Error::Decode)?;
        let img = self.scale(img);
        let rgb = img.to_rgb8();

        let mut out = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut out, self.quality);
        encoder
            .encode(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ColorType::Rgb8.into(),
            )
            .map_err(Error::Encode)?;
        Ok(out)
    }

    fn scale(&self, img: DynamicImage) -> DynamicImage {
        let (width, height) = (img.width(), img.height());
        let (new_width, new_height) = scaled_dimensions(width, height, self.max_width);
        if (new_width, new_height) == (width, height) {
            return img;
        }
        debug!(width, height, new_width, new_height, "scaling image");
        img.resize_exact(new_width, new_height, FilterType::Triangle)
    }
}

/// Embed `bytes` as a data URL without re-encoding, typed by the detected image format
pub fn encode_data_url(bytes: &[u8]) -> Result<ImageRef> {
    let format = image::guess_format(bytes).map_err(Error::Decode)?;
    Ok(ImageRef::Embedded(data_url(format.to_mime_type(), bytes)))
}

fn data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn jpeg_quality(fraction: f32) -> u8 {
    if fraction.is_nan() {
        return jpeg_quality(DEFAULT_QUALITY);
    }
    (fraction * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Largest size with the same aspect ratio whose sides both fit within `max`, never upscaling
fn scaled_dimensions(width: u32, height: u32, max: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max {
        return (width, height);
    }
    let ratio = f64::from(max) / f64::from(longest);
    let scale = |side: u32| ((f64::from(side) * ratio).round() as u32).clamp(1, max);
    (scale(width), scale(height))
}
