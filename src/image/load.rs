//! Image loading utilities.

use std::path::Path;

use image::GenericImageView;

use crate::error::{Error, Result};

use super::RawImage;

/// Load an image from disk into packed pixels.
///
/// The format is sniffed from the file contents, so a mislabelled extension
/// still decodes. Colour types other than RGB(A) are converted; alpha is kept
/// in the top byte but never read by the classifier.
///
/// # Errors
///
/// Returns an error if the image cannot be opened or decoded.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RawImage> {
    let path = path.as_ref();

    let img = image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|source| Error::ImageLoad {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(source),
        })?
        .decode()
        .map_err(|source| Error::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;

    let (width, height) = img.dimensions();
    tracing::debug!("Loaded {} ({width}x{height})", path.display());

    RawImage::from_dynamic(&img)
}

/// Decode an in-memory encoded image (PNG, JPEG, ...) into packed pixels.
///
/// # Errors
///
/// Returns an error if the bytes are not a decodable image.
pub fn load_image_from_memory(bytes: &[u8]) -> Result<RawImage> {
    let img = image::load_from_memory(bytes).map_err(Error::ImageDecode)?;
    RawImage::from_dynamic(&img)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};

    use super::*;
    use crate::image::pack_rgb;

    fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_load_from_memory() {
        let img = RgbImage::from_pixel(3, 2, Rgb([200, 100, 50]));
        let raw = load_image_from_memory(&encode_png(&img)).unwrap();

        assert_eq!((raw.width(), raw.height()), (3, 2));
        assert!(raw.pixels().iter().all(|&p| p == pack_rgb(200, 100, 50)));
    }

    #[test]
    fn test_load_from_memory_rejects_garbage() {
        assert!(matches!(
            load_image_from_memory(b"not an image"),
            Err(Error::ImageDecode(_))
        ));
    }

    #[test]
    fn test_load_sniffs_format_from_contents() {
        let img = RgbImage::from_pixel(4, 4, Rgb([0, 255, 0]));
        // Deliberately wrong extension
        let path = std::env::temp_dir()
            .join(format!("animal-classifier-sniff-{}.jpg", std::process::id()));
        std::fs::write(&path, encode_png(&img)).unwrap();

        let raw = load_image(&path);
        std::fs::remove_file(&path).unwrap();

        let raw = raw.unwrap();
        assert_eq!(raw.pixel(2, 2), Some(pack_rgb(0, 255, 0)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_image("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, Error::ImageLoad { .. }));
    }
}
