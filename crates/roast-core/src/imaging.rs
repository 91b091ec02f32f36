//! Image preparation for the vision endpoint
//!
//! The vision backends only accept plain RGB JPEG, so anything carrying
//! transparency is flattened onto white before encoding.

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError, Rgb, RgbImage};

pub const JPEG_QUALITY: u8 = 95;

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    image::load_from_memory(bytes)
}

/// Composite the image over an opaque white background using its own alpha.
/// Images without an alpha channel are only converted to 8-bit RGB.
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    let mut flattened = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = u16::from(pixel[3]);
        let blend = |channel: u8| -> u8 {
            ((u16::from(channel) * alpha + 255 * (255 - alpha)) / 255) as u8
        };
        flattened.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }
    flattened
}

pub fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, ImageError> {
    let flattened = flatten_onto_white(image);
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    flattened.write_with_encoder(encoder)?;
    Ok(bytes)
}

pub fn to_jpeg_data_url(image: &DynamicImage) -> Result<String, ImageError> {
    let bytes = encode_jpeg(image)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:image/jpeg;base64,{}", encoded))
}
