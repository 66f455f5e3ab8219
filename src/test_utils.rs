use crate::compositor;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// Encode a synthetic PNG of the given size, with enough pixel variation to
/// survive lossy re-encoding without degenerating to a flat color.
pub fn sample_image_bytes(width: u32, height: u32) -> Bytes {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 251) as u8, (y % 241) as u8, ((x + y) % 233) as u8])
    }));
    Bytes::from(compositor::encode(&image, ImageFormat::Png).expect("encode sample image"))
}
