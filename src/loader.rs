//! Input loading boundary.
//!
//! Decoding, normalization, and raw label-map loading sit outside the pure
//! transform core; this module is that boundary. It produces the two aligned
//! grids the pipeline consumes:
//!
//! - the RGB image, decoded with the `image` crate, converted to `f32` and
//!   mean-centered with the configured per-channel constants;
//! - the class map, read from a flat row-major `u8` file whose dimensions
//!   are implied by the image it annotates.
//!
//! The 1:1 source-resolution alignment between the two is a checked
//! precondition here, not an assumption: a label file whose cell count does
//! not match the image raises [`PrepError::ShapeMismatch`] for that image
//! alone.

use crate::error::{PrepError, PrepResult};
use crate::grid::{ClassMap, NormalizedImage};
use image::RgbImage;
use std::path::Path;

/// Decodes an RGB image and mean-centers each channel.
///
/// `means` are subtracted in RGB order; zero means leave the values as
/// plain `f32` casts of the source bytes.
pub fn load_normalized_image<P: AsRef<Path>>(
    path: P,
    means: [f32; 3],
) -> PrepResult<NormalizedImage> {
    let rgb = image::open(path.as_ref())?.to_rgb8();
    normalize(&rgb, means)
}

/// Converts a decoded RGB image to a mean-centered float grid.
pub fn normalize(rgb: &RgbImage, means: [f32; 3]) -> PrepResult<NormalizedImage> {
    let rows = rgb.height() as usize;
    let cols = rgb.width() as usize;
    let mut data = Vec::with_capacity(rows * cols * NormalizedImage::DEPTH);
    for pixel in rgb.pixels() {
        for channel in 0..NormalizedImage::DEPTH {
            data.push(f32::from(pixel.0[channel]) - means[channel]);
        }
    }
    NormalizedImage::from_vec(rows, cols, data)
}

/// Loads a flat `u8` label map and checks its alignment against the image.
///
/// The file must hold exactly `rows * cols` bytes, where `(rows, cols)` are
/// the image's source dimensions.
///
/// # Errors
///
/// Returns [`PrepError::ShapeMismatch`] when the cell count disagrees with
/// the image, and I/O errors when the file cannot be read.
pub fn load_class_map<P: AsRef<Path>>(
    path: P,
    image: &NormalizedImage,
) -> PrepResult<ClassMap> {
    let raw = std::fs::read(path.as_ref())?;
    let rows = image.rows();
    let cols = image.cols();
    let expected = rows * cols;
    if raw.len() != expected {
        return Err(PrepError::ShapeMismatch {
            image_rows: rows,
            image_cols: cols,
            label_cells: raw.len(),
            expected,
        });
    }
    ClassMap::from_raw(rows, cols, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::TempDir;

    fn two_by_two() -> RgbImage {
        let mut rgb = RgbImage::new(2, 2);
        rgb.put_pixel(0, 0, Rgb([10, 20, 30]));
        rgb.put_pixel(1, 0, Rgb([40, 50, 60]));
        rgb.put_pixel(0, 1, Rgb([70, 80, 90]));
        rgb.put_pixel(1, 1, Rgb([100, 110, 120]));
        rgb
    }

    #[test]
    fn normalization_subtracts_channel_means() {
        let image = normalize(&two_by_two(), [10.0, 20.0, 30.0]).unwrap();
        assert_eq!((image.rows(), image.cols()), (2, 2));
        assert_eq!(&image.data()[..3], &[0.0, 0.0, 0.0]);
        assert_eq!(&image.data()[3..6], &[30.0, 30.0, 30.0]);
    }

    #[test]
    fn zero_means_keep_raw_values() {
        let image = normalize(&two_by_two(), [0.0; 3]).unwrap();
        assert_eq!(image.data()[0], 10.0);
        assert_eq!(image.data()[11], 120.0);
    }

    #[test]
    fn label_map_alignment_is_enforced() {
        let dir = TempDir::new().unwrap();
        let image = normalize(&two_by_two(), [0.0; 3]).unwrap();

        let good = dir.path().join("good.bin");
        std::fs::write(&good, [0u8, 1, 2, 3]).unwrap();
        let map = load_class_map(&good, &image).unwrap();
        assert_eq!(map.data(), &[0, 1, 2, 3]);

        let bad = dir.path().join("bad.bin");
        std::fs::write(&bad, [0u8, 1, 2]).unwrap();
        match load_class_map(&bad, &image) {
            Err(PrepError::ShapeMismatch {
                label_cells,
                expected,
                ..
            }) => {
                assert_eq!(label_cells, 3);
                assert_eq!(expected, 4);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }
}
