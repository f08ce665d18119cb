//! Input tensor buffer and image serialization.

use ndarray::ArrayView4;

use crate::error::{Error, Result};
use crate::image::{resize_exact, RawImage, IMG_SIZE, PIXEL_SIZE};

/// Images per inference call.
pub const BATCH_SIZE: usize = 1;

/// Number of `f32` values in one input tensor.
pub const INPUT_LEN: usize = BATCH_SIZE * IMG_SIZE as usize * IMG_SIZE as usize * PIXEL_SIZE;

/// Size of one input tensor in bytes.
pub const INPUT_BYTES: usize = INPUT_LEN * std::mem::size_of::<f32>();

/// Borrowed input tensor in NHWC format (batch, height, width, channels).
pub type InputView<'a> = ArrayView4<'a, f32>;

/// Fixed-capacity input buffer with a write cursor.
///
/// Allocated once and reused for every prediction. Writers must call
/// [`InputTensor::rewind`] before filling it again; [`serialize`] does this
/// itself.
#[derive(Debug, Clone)]
pub struct InputTensor {
    data: Vec<f32>,
    cursor: usize,
}

impl Default for InputTensor {
    fn default() -> Self {
        Self::new()
    }
}

impl InputTensor {
    /// Allocate a zeroed buffer of exactly [`INPUT_LEN`] values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: vec![0.0; INPUT_LEN],
            cursor: 0,
        }
    }

    /// Reset the write cursor to the start. Contents are left in place and
    /// will be overwritten.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Append one value at the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is already full.
    pub fn put(&mut self, value: f32) -> Result<()> {
        let slot = self
            .data
            .get_mut(self.cursor)
            .ok_or(Error::TensorOverflow {
                capacity: INPUT_LEN,
            })?;
        *slot = value;
        self.cursor += 1;
        Ok(())
    }

    /// Number of values written since the last rewind.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor
    }

    /// Number of values the buffer holds, always [`INPUT_LEN`].
    #[must_use]
    pub const fn capacity(&self) -> usize {
        INPUT_LEN
    }

    /// Whether every slot has been written since the last rewind.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.cursor == INPUT_LEN
    }

    /// Fail unless every slot has been written since the last rewind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TensorIncomplete`] if the buffer is partially filled.
    pub fn ensure_full(&self) -> Result<()> {
        if self.is_full() {
            Ok(())
        } else {
            Err(Error::TensorIncomplete {
                written: self.cursor,
                capacity: INPUT_LEN,
            })
        }
    }

    /// Raw values, channel-interleaved in row-major pixel order.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Contents as native-endian bytes, exactly [`INPUT_BYTES`] long.
    #[must_use]
    pub fn to_ne_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    /// Borrow the contents as an NHWC array for the inference engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer cannot be shaped as `[1, 32, 32, 3]`.
    pub fn view(&self) -> Result<InputView<'_>> {
        let size = IMG_SIZE as usize;
        ArrayView4::from_shape((BATCH_SIZE, size, size, PIXEL_SIZE), &self.data).map_err(|_| {
            Error::ShapeMismatch {
                expected: format!("[{BATCH_SIZE}, {size}, {size}, {PIXEL_SIZE}]"),
                actual: format!("{} values", self.data.len()),
            }
        })
    }
}

/// Map an 8-bit channel to [0, 1].
#[inline]
#[must_use]
pub fn normalize_channel(value: u8) -> f32 {
    f32::from(value) / 255.0
}

/// Split a packed pixel into normalized R, G, B. Alpha is ignored.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn pixel_to_rgb(pixel: u32) -> [f32; 3] {
    // Safe: each channel is masked to 8 bits before casting
    [
        normalize_channel(((pixel >> 16) & 0xFF) as u8),
        normalize_channel(((pixel >> 8) & 0xFF) as u8),
        normalize_channel((pixel & 0xFF) as u8),
    ]
}

/// Write an already-resized image into the tensor.
///
/// The cursor is rewound first, then every pixel is appended row by row as
/// three normalized floats (R, G, B). The image must be exactly
/// `IMG_SIZE x IMG_SIZE`; the tensor is untouched otherwise.
///
/// # Errors
///
/// Returns an error if the image has the wrong size.
pub fn serialize(img: &RawImage, tensor: &mut InputTensor) -> Result<()> {
    if (img.width(), img.height()) != (IMG_SIZE, IMG_SIZE) {
        return Err(Error::ShapeMismatch {
            expected: format!("{IMG_SIZE}x{IMG_SIZE} image"),
            actual: format!("{}x{} image", img.width(), img.height()),
        });
    }

    tensor.rewind();
    for &pixel in img.pixels() {
        for channel in pixel_to_rgb(pixel) {
            tensor.put(channel)?;
        }
    }

    tensor.ensure_full()
}

/// Resize an arbitrary image to the model input size and serialize it.
///
/// # Errors
///
/// Returns an error if resizing or serialization fails.
pub fn prepare(img: &RawImage, tensor: &mut InputTensor) -> Result<()> {
    let resized = resize_exact(img, IMG_SIZE)?;
    serialize(&resized, tensor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::pack_rgb;

    #[allow(clippy::cast_possible_truncation)]
    fn noise(width: u32, height: u32) -> RawImage {
        let pixels = (0..width * height)
            .map(|i| pack_rgb((i * 31) as u8, (i * 17) as u8, (i * 3) as u8))
            .collect();
        RawImage::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn test_capacity_matches_model_input() {
        let tensor = InputTensor::new();
        assert_eq!(tensor.capacity(), 3072);
        assert_eq!(tensor.as_slice().len(), 3072);
        assert_eq!(tensor.to_ne_bytes().len(), INPUT_BYTES);
        assert_eq!(INPUT_BYTES, 12_288);
    }

    #[test]
    fn test_prepare_fills_exactly_once() {
        let mut tensor = InputTensor::new();
        prepare(&noise(50, 70), &mut tensor).unwrap();

        assert!(tensor.is_full());
        assert_eq!(tensor.position(), INPUT_LEN);
        assert!(tensor.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_solid_red_image() {
        let img = RawImage::filled(64, 64, pack_rgb(255, 0, 0)).unwrap();
        let mut tensor = InputTensor::new();
        prepare(&img, &mut tensor).unwrap();

        for triple in tensor.as_slice().chunks_exact(PIXEL_SIZE) {
            assert!((triple[0] - 1.0).abs() < 1e-6);
            assert!(triple[1].abs() < 1e-6);
            assert!(triple[2].abs() < 1e-6);
        }
    }

    #[test]
    fn test_channel_order_and_alpha_ignored() {
        let mut pixels = vec![0u32; (IMG_SIZE * IMG_SIZE) as usize];
        pixels[0] = 0x00FF_8000;
        pixels[1] = 0x7F00_00FF;
        let img = RawImage::from_pixels(IMG_SIZE, IMG_SIZE, pixels).unwrap();

        let mut tensor = InputTensor::new();
        serialize(&img, &mut tensor).unwrap();

        let data = tensor.as_slice();
        assert_eq!(data[0], 1.0);
        assert!((data[1] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(data[2], 0.0);
        assert_eq!(&data[3..6], &[0.0f32, 0.0, 1.0]);
    }

    #[test]
    fn test_normalization_round_trip() {
        for value in 0..=255u8 {
            let restored = (normalize_channel(value) * 255.0).round();
            assert_eq!(restored, f32::from(value), "channel value {value}");
        }
    }

    #[test]
    fn test_reuse_after_rewind_is_deterministic() {
        let img = noise(40, 40);
        let mut tensor = InputTensor::new();

        prepare(&img, &mut tensor).unwrap();
        let first = tensor.to_ne_bytes();

        prepare(&noise(10, 90), &mut tensor).unwrap();
        prepare(&img, &mut tensor).unwrap();

        assert_eq!(tensor.to_ne_bytes(), first);
    }

    #[test]
    fn test_put_past_capacity_fails() {
        let mut tensor = InputTensor::new();
        for _ in 0..INPUT_LEN {
            tensor.put(0.5).unwrap();
        }
        assert!(matches!(
            tensor.put(0.5),
            Err(Error::TensorOverflow { capacity: INPUT_LEN })
        ));
    }

    #[test]
    fn test_partial_fill_is_incomplete() {
        let mut tensor = InputTensor::new();
        tensor.put(0.1).unwrap();
        assert!(matches!(
            tensor.ensure_full(),
            Err(Error::TensorIncomplete { written: 1, .. })
        ));
    }

    #[test]
    fn test_serialize_rejects_unresized_image() {
        let mut tensor = InputTensor::new();
        let err = serialize(&noise(16, 16), &mut tensor).unwrap_err();

        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert_eq!(tensor.position(), 0);
    }

    #[test]
    fn test_view_is_borrowed_nhwc() {
        let mut tensor = InputTensor::new();
        prepare(&noise(32, 32), &mut tensor).unwrap();
        let view = tensor.view().unwrap();

        assert_eq!(view.shape(), &[1, 32, 32, 3]);
        assert_eq!(view[[0, 0, 1, 0]], tensor.as_slice()[3]);
        // Borrowed, not copied
        assert_eq!(view.as_ptr(), tensor.as_slice().as_ptr());
    }
}
