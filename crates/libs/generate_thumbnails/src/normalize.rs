use crate::{encode_jpeg, ensure_supported};
use color_eyre::Result;
use image::{DynamicImage, Rgba, RgbaImage, imageops};

/// Flattens any supported image onto a white background and re-encodes it as JPEG.
pub fn normalize_to_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>> {
    ensure_supported(bytes)?;
    let src = image::load_from_memory(bytes)?.into_rgba8();
    let (width, height) = src.dimensions();

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut canvas, &src, 0, 0);

    let opaque = DynamicImage::ImageRgba8(canvas).into_rgb8();
    encode_jpeg(&opaque, quality)
}
