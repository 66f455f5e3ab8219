use super::*;
use image::{GenericImageView, Rgb, RgbImage};

fn solid_tile(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

#[test]
fn canvas_dimensions_are_cols_by_rows_tiles() {
    let canvas = CollageCanvas::new(3, 4, 10, 20).unwrap();
    let image = canvas.into_image();
    assert_eq!(image.dimensions(), (40, 60));
}

#[test]
fn empty_grid_is_rejected() {
    assert!(matches!(
        CollageCanvas::new(0, 3, 10, 10),
        Err(CompositorError::EmptyGrid)
    ));
    assert!(matches!(
        CollageCanvas::new(3, 0, 10, 10),
        Err(CompositorError::EmptyGrid)
    ));
}

#[test]
fn cells_iterate_row_major() {
    let canvas = CollageCanvas::new(2, 3, 1, 1).unwrap();
    assert_eq!(
        canvas.cells(),
        vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
    );
    assert_eq!(canvas.tile_count(), 6);
}

#[test]
fn placed_tiles_land_at_grid_offsets() {
    let tile = solid_tile(4, 4, [200, 10, 30]);
    let mut canvas = CollageCanvas::new(2, 2, 4, 4).unwrap();
    for (row, col) in canvas.cells() {
        canvas.place(&tile, row, col);
    }
    let image = canvas.into_image();

    // One probe pixel inside each quadrant
    for (x, y) in [(1, 1), (5, 1), (1, 5), (5, 5)] {
        assert_eq!(image.get_pixel(x, y).0[..3], [200, 10, 30]);
    }
}

#[test]
fn partially_filled_canvas_keeps_background_elsewhere() {
    let tile = solid_tile(4, 4, [255, 255, 255]);
    let mut canvas = CollageCanvas::new(2, 2, 4, 4).unwrap();
    canvas.place(&tile, 0, 0);
    let image = canvas.into_image();

    assert_eq!(image.get_pixel(1, 1).0[..3], [255, 255, 255]);
    // Cell (1, 1) was never filled
    assert_eq!(image.get_pixel(5, 5).0[..3], [0, 0, 0]);
}

#[test]
fn resize_matches_requested_dimensions_exactly() {
    let source = solid_tile(100, 50, [1, 2, 3]);
    let resized = resize(&source, 30, 30);
    assert_eq!(resized.dimensions(), (30, 30));
}

#[test]
fn encode_then_decode_preserves_dimensions() {
    let source = solid_tile(17, 9, [120, 60, 30]);
    let bytes = encode(&source, ImageFormat::Jpeg).unwrap();
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (17, 9));
}

#[test]
fn encode_is_deterministic() {
    let source = solid_tile(16, 16, [9, 9, 9]);
    let first = encode(&source, ImageFormat::Png).unwrap();
    let second = encode(&source, ImageFormat::Png).unwrap();
    assert_eq!(first, second);
}

#[test]
fn decode_rejects_garbage_bytes() {
    assert!(matches!(
        decode(b"definitely not an image"),
        Err(CompositorError::DecodeError(_))
    ));
}

#[test]
fn six_by_six_grid_of_200px_tiles_is_1200_square() {
    let tile = solid_tile(200, 200, [80, 80, 80]);
    let mut canvas = CollageCanvas::new(6, 6, 200, 200).unwrap();
    for (row, col) in canvas.cells() {
        canvas.place(&tile, row, col);
    }
    assert_eq!(canvas.into_image().dimensions(), (1200, 1200));
}
