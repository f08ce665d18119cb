//! Non-uniform resizing to the model's square input.

use image::imageops::{self, FilterType};

use crate::error::{Error, Result};

use super::RawImage;

/// Scale an image to exactly `size x size` pixels.
///
/// Horizontal and vertical factors are independent (`size / width` and
/// `size / height`), so non-square sources are stretched rather than
/// letterboxed. Sampling is unfiltered nearest-neighbour, which is what the
/// model's training pipeline used.
///
/// # Errors
///
/// Returns an error if `size` is zero.
pub fn resize_exact(img: &RawImage, size: u32) -> Result<RawImage> {
    if size == 0 {
        return Err(Error::InvalidParameter {
            name: "size".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }

    if (img.width(), img.height()) == (size, size) {
        return Ok(img.clone());
    }

    let resized = imageops::resize(&img.to_rgba(), size, size, FilterType::Nearest);
    RawImage::from_rgba(&resized)
}
