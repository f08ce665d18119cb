//! Packed-pixel image representation.

use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::{Error, Result};

/// Pack 8-bit channels into a single pixel value.
///
/// Layout is `0xAARRGGBB`: red in bits 16-23, green in bits 8-15, blue in bits 0-7.
/// Alpha is always set to opaque; the classifier never reads it.
#[must_use]
pub const fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// A 2D grid of packed `0xAARRGGBB` pixels in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl RawImage {
    /// Build an image from packed pixels laid out row by row.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or the pixel count does not
    /// match `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::UnsupportedDimensions {
                width,
                height,
                reason: "image must not be empty".to_string(),
            });
        }

        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::ShapeMismatch {
                expected: format!("{expected} pixels"),
                actual: format!("{} pixels", pixels.len()),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// An image where every pixel has the same value.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn filled(width: u32, height: u32, pixel: u32) -> Result<Self> {
        Self::from_pixels(width, height, vec![pixel; width as usize * height as usize])
    }

    /// Convert a decoded image of any colour type.
    ///
    /// # Errors
    ///
    /// Returns an error if the image has a zero dimension.
    pub fn from_dynamic(img: &DynamicImage) -> Result<Self> {
        Self::from_rgba(&img.to_rgba8())
    }

    /// Convert an RGBA buffer, keeping its alpha in the top byte.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has a zero dimension.
    pub fn from_rgba(img: &RgbaImage) -> Result<Self> {
        let pixels = img
            .pixels()
            .map(|&Rgba([r, g, b, a])| {
                (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
            })
            .collect();

        Self::from_pixels(img.width(), img.height(), pixels)
    }

    /// Convert back into an RGBA buffer.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_rgba(&self) -> RgbaImage {
        let mut img = RgbaImage::new(self.width, self.height);
        for (dst, &p) in img.pixels_mut().zip(&self.pixels) {
            // Safe: each channel is masked to 8 bits before casting
            *dst = Rgba([
                ((p >> 16) & 0xFF) as u8,
                ((p >> 8) & 0xFF) as u8,
                (p & 0xFF) as u8,
                ((p >> 24) & 0xFF) as u8,
            ]);
        }
        img
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// All pixels, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixel at column `x`, row `y`, if in bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}
