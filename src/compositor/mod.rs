//! Pure image transformations: decode, exact resize, grid composition,
//! deterministic encode. No I/O happens here; the pipeline engine owns all
//! store interaction and drives progress reporting off the tile iteration.

use image::imageops::FilterType;
use image::{imageops, DynamicImage, ImageFormat};
use std::io::Cursor;
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Errors that can occur during pure image transformation
#[derive(Error, Debug)]
pub enum CompositorError {
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image as {0:?}: {1}")]
    EncodeError(ImageFormat, String),

    #[error("Collage grid must have at least one row and one column")]
    EmptyGrid,
}

/// Decode raw bytes into an image, sniffing the format from the content
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, CompositorError> {
    image::load_from_memory(bytes).map_err(|e| CompositorError::DecodeError(e.to_string()))
}

/// Scale to the exact target dimensions. Aspect ratio is intentionally not
/// preserved; the output matches the requested size precisely.
pub fn resize(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    image.resize_exact(width, height, FilterType::Triangle)
}

/// Encode an image into a byte buffer. JPEG has no alpha channel, so the
/// image is flattened to RGB first for that format.
pub fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, CompositorError> {
    let mut buffer = Cursor::new(Vec::new());
    let result = match format {
        ImageFormat::Jpeg => {
            DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut buffer, format)
        }
        _ => image.write_to(&mut buffer, format),
    };
    result.map_err(|e| CompositorError::EncodeError(format, e.to_string()))?;
    Ok(buffer.into_inner())
}

/// A collage canvas of `cols * tile_width` by `rows * tile_height` pixels.
///
/// Every cell receives a copy of the same source tile; the grid is filled
/// in row-major order. The ordering only matters for progress reporting,
/// since all tiles are identical.
pub struct CollageCanvas {
    canvas: DynamicImage,
    rows: u32,
    cols: u32,
    tile_width: u32,
    tile_height: u32,
}

impl CollageCanvas {
    pub fn new(
        rows: u32,
        cols: u32,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self, CompositorError> {
        if rows == 0 || cols == 0 {
            return Err(CompositorError::EmptyGrid);
        }
        Ok(CollageCanvas {
            canvas: DynamicImage::new_rgb8(cols * tile_width, rows * tile_height),
            rows,
            cols,
            tile_width,
            tile_height,
        })
    }

    pub fn tile_count(&self) -> u32 {
        self.rows * self.cols
    }

    /// Grid cells in row-major fill order
    pub fn cells(&self) -> Vec<(u32, u32)> {
        let mut cells = Vec::with_capacity(self.tile_count() as usize);
        for row in 0..self.rows {
            for col in 0..self.cols {
                cells.push((row, col));
            }
        }
        cells
    }

    /// Blit the tile into cell (row, col) at pixel offset
    /// `(col * tile_width, row * tile_height)`
    pub fn place(&mut self, tile: &DynamicImage, row: u32, col: u32) {
        let x = (col * self.tile_width) as i64;
        let y = (row * self.tile_height) as i64;
        imageops::overlay(&mut self.canvas, tile, x, y);
    }

    pub fn into_image(self) -> DynamicImage {
        self.canvas
    }
}
