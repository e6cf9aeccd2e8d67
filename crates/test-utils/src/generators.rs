//! Test data generators for synthetic elevation imagery.
//!
//! These generators create predictable, verifiable elevation patterns
//! that can be used across the test suite.

use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Luma};

/// Creates an elevation grid with predictable values.
///
/// Each sample is calculated as: `col * 100 + row`
///
/// # Arguments
///
/// * `width` - Number of columns
/// * `height` - Number of rows
///
/// # Returns
///
/// A `Vec<i16>` in row-major order (row 0 first, then row 1, etc.)
///
/// # Example
///
/// ```
/// use test_utils::create_elevation_grid;
///
/// let grid = create_elevation_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 100);  // col=1, row=0
/// assert_eq!(grid[10], 1);   // col=0, row=1
/// ```
pub fn create_elevation_grid(width: usize, height: usize) -> Vec<i16> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 100 + row) as i16);
        }
    }
    data
}

/// Creates a 16-bit grayscale image whose samples are `col * 100 + row`.
///
/// Negative values (below sea level) are stored as their two's complement,
/// the way signed DEM rasters are delivered as 16-bit grayscale.
pub fn create_elevation_image(width: u32, height: u32) -> DynamicImage {
    let grid = create_elevation_grid(width as usize, height as usize);
    let buffer: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_fn(width, height, |x, y| {
        Luma([grid[(y * width + x) as usize] as u16])
    });
    DynamicImage::ImageLuma16(buffer)
}

/// Creates a 16-bit grayscale image with every sample set to `value`.
pub fn create_constant_elevation_image(width: u32, height: u32, value: i16) -> DynamicImage {
    let buffer: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_pixel(width, height, Luma([value as u16]));
    DynamicImage::ImageLuma16(buffer)
}

/// Encodes an image as PNG bytes, as a WMS server would return it.
pub fn encode_png(image: &DynamicImage) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .expect("PNG encoding of an in-memory image");
    bytes.into_inner()
}
