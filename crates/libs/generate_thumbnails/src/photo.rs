use crate::{ThumbOptions, encode_jpeg, ensure_supported};
use color_eyre::eyre::{Result, eyre};
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use std::io::Cursor;

/// Generates a JPEG thumbnail that exactly fills `config.width` x `config.height`.
///
/// The source is center-cropped to the target aspect ratio, so nothing is letterboxed
/// and nothing is stretched.
pub fn generate_thumbnail(bytes: &[u8], config: &ThumbOptions) -> Result<Vec<u8>> {
    ensure_supported(bytes)?;
    if config.width == 0 || config.height == 0 {
        return Err(eyre!("thumbnail size must be non-zero"));
    }

    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    // Correct the orientation based on the EXIF data.
    img.apply_orientation(orientation);

    let src_img = img.into_rgb8();
    let (orig_w, orig_h) = src_img.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return Err(eyre!("source image has no pixels"));
    }

    let src_image = Image::from_vec_u8(orig_w, orig_h, src_img.into_raw(), PixelType::U8x3)?;
    let mut dst_image = Image::new(config.width, config.height, PixelType::U8x3);

    let options = ResizeOptions::new()
        .resize_alg(ResizeAlg::Convolution(FilterType::CatmullRom))
        .fit_into_destination(Some((0.5, 0.5)));
    Resizer::new().resize(&src_image, &mut dst_image, &options)?;

    let thumb = RgbImage::from_raw(config.width, config.height, dst_image.into_vec())
        .ok_or_else(|| eyre!("Failed to construct resized image"))?;

    encode_jpeg(&thumb, config.quality)
}
