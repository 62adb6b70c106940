#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

//! # Thumbnail Generation Crate
//!
//! Turns uploaded JPEG/PNG bytes into what the photo store keeps:
//!
//! - **Thumbnails**: a fixed-size preview, filling the target box by center-cropping the
//!   source and resampling with a Catmull-Rom filter, re-encoded as baseline JPEG.
//!   EXIF orientation is applied before resizing.
//! - **Normalization**: transparent or palette PNGs are composited onto a white background
//!   and re-encoded as opaque JPEG, so every stored image shares one format.
//!
//! Everything here is CPU bound and synchronous; async callers should run it on a
//! blocking thread.

mod normalize;
mod photo;

use app_state::ThumbnailSettings;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};

pub use normalize::normalize_to_jpeg;
pub use photo::generate_thumbnail;

/// Size and encoding of generated thumbnails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbOptions {
    pub width: u32,
    pub height: u32,
    /// JPEG quality, 1..=100.
    pub quality: u8,
}

impl Default for ThumbOptions {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            quality: 85,
        }
    }
}

impl From<&ThumbnailSettings> for ThumbOptions {
    fn from(settings: &ThumbnailSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            quality: settings.quality,
        }
    }
}

/// Fails unless `bytes` look like one of the raster formats we handle.
pub fn ensure_supported(bytes: &[u8]) -> Result<ImageFormat> {
    let format = image::guess_format(bytes)?;
    match format {
        ImageFormat::Jpeg | ImageFormat::Png => Ok(format),
        other => Err(eyre!("unsupported image format: {other:?}")),
    }
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    encoder.encode_image(image)?;
    Ok(out)
}
