//! Image preprocessing for `nn-digits predict`.
//!
//! Decodes any PNG/JPEG/BMP/GIF file, resizes it to the 28×28 MNIST grid and
//! normalizes grayscale intensities to [0, 1] ready for `NeuralNetwork::predict`.

use std::path::Path;

use nn_digits::dataset::IMAGE_SIDE;

/// Loads `path` as a flat row-major `Vec<f32>` of length 784.
///
/// MNIST digits are light strokes on a dark background; pass `invert` for the
/// usual dark-on-light scans and drawings.
pub fn image_file_to_input(path: &Path, invert: bool) -> Result<Vec<f32>, image::ImageError> {
    let img = image::open(path)?;
    let side = IMAGE_SIDE as u32;
    let resized = img.resize_exact(side, side, image::imageops::FilterType::Lanczos3);
    let gray = resized.to_luma8();
    Ok(gray
        .pixels()
        .map(|p| {
            let v = p.0[0] as f32 / 255.0;
            if invert { 1.0 - v } else { v }
        })
        .collect())
}
