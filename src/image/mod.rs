//! Image loading and resizing utilities.

mod load;
mod raw;
mod resize;

pub use load::{load_image, load_image_from_memory};
pub use raw::{pack_rgb, RawImage};
pub use resize::resize_exact;

/// Side of the square input the model was trained on.
pub const IMG_SIZE: u32 = 32;

/// Number of channels per pixel fed to the model (R, G, B).
pub const PIXEL_SIZE: usize = 3;
