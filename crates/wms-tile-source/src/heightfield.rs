//! Elevation grids built from fetched imagery.

use image::{DynamicImage, GenericImageView};
use serde::Serialize;

/// A grid of elevation samples.
///
/// Row 0 is the southern edge; columns run west to east.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeightField {
    width: u32,
    height: u32,
    samples: Vec<f32>,
}

impl HeightField {
    /// All-zero field.
    pub fn flat(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            samples: vec![0.0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples in row-major order, southern row first.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample at (col, row), row counted from the south.
    pub fn height_at(&self, col: u32, row: u32) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.samples
            .get(row as usize * self.width as usize + col as usize)
            .copied()
    }

    /// Multiply every sample by `factor`.
    pub fn scale(&mut self, factor: f32) {
        for sample in &mut self.samples {
            *sample *= factor;
        }
    }

    /// Smallest and largest sample.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.samples.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Converts decoded tile images into height fields.
#[derive(Debug, Clone, Copy)]
pub struct ImageToHeightFieldConverter {
    fallback_size: u32,
}

impl ImageToHeightFieldConverter {
    /// `fallback_size` is the edge of the flat field returned for a missing image.
    pub fn new(fallback_size: u32) -> Self {
        Self { fallback_size }
    }

    /// Convert an image, or produce a flat field when there is none.
    ///
    /// 16-bit grayscale is read as signed integers, the usual DEM encoding.
    /// Other layouts use their first channel as-is.
    pub fn convert(&self, image: Option<&DynamicImage>) -> HeightField {
        let Some(image) = image else {
            return HeightField::flat(self.fallback_size, self.fallback_size);
        };

        let (width, height) = image.dimensions();
        let mut samples = Vec::with_capacity(width as usize * height as usize);

        // Image rows run north to south.
        for row in (0..height).rev() {
            for col in 0..width {
                samples.push(sample(image, col, row));
            }
        }

        HeightField {
            width,
            height,
            samples,
        }
    }
}

fn sample(image: &DynamicImage, x: u32, y: u32) -> f32 {
    match image {
        DynamicImage::ImageLuma16(buf) => buf.get_pixel(x, y).0[0] as i16 as f32,
        DynamicImage::ImageLumaA16(buf) => buf.get_pixel(x, y).0[0] as i16 as f32,
        DynamicImage::ImageLuma8(buf) => buf.get_pixel(x, y).0[0] as f32,
        DynamicImage::ImageLumaA8(buf) => buf.get_pixel(x, y).0[0] as f32,
        DynamicImage::ImageRgb32F(buf) => buf.get_pixel(x, y).0[0],
        DynamicImage::ImageRgba32F(buf) => buf.get_pixel(x, y).0[0],
        other => other.get_pixel(x, y).0[0] as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    #[test]
    fn test_missing_image_is_flat() {
        let field = ImageToHeightFieldConverter::new(16).convert(None);
        assert_eq!(field.width(), 16);
        assert_eq!(field.height(), 16);
        assert!(field.samples().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_rows_stored_south_first() {
        // Top (north) row 100, bottom (south) row 5.
        let buf: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_fn(2, 2, |_, y| Luma([if y == 0 { 100 } else { 5 }]));
        let field =
            ImageToHeightFieldConverter::new(2).convert(Some(&DynamicImage::ImageLuma16(buf)));

        assert_eq!(field.height_at(0, 0), Some(5.0));
        assert_eq!(field.height_at(1, 1), Some(100.0));
        assert_eq!(field.height_at(2, 0), None);
    }

    #[test]
    fn test_sixteen_bit_is_signed() {
        let buf: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(1, 1, Luma([(-40i16) as u16]));
        let field =
            ImageToHeightFieldConverter::new(1).convert(Some(&DynamicImage::ImageLuma16(buf)));
        assert_eq!(field.samples(), &[-40.0]);
    }

    #[test]
    fn test_scale_and_range() {
        let mut field = HeightField {
            width: 2,
            height: 1,
            samples: vec![-10.0, 1000.0],
        };
        field.scale(0.5);
        assert_eq!(field.min_max(), Some((-5.0, 500.0)));
        assert_eq!(HeightField::flat(0, 0).min_max(), None);
    }
}
