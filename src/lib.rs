//! # `animal-classifier`
//!
//! Classifies a picture as a cat, a dog or a panda with a small pre-trained
//! convolutional network run through ONNX Runtime.
//!
//! An image of any size is stretched to 32x32, serialized into a reused
//! channel-interleaved `f32` buffer with every channel scaled to [0, 1], run
//! through the model, and the largest of the three output probabilities picks
//! the label.
//!
//! ## Example
//!
//! ```no_run
//! use animal_classifier::{Classifier, Config, image};
//!
//! # fn main() -> animal_classifier::Result<()> {
//! let config = Config::default();
//! let mut classifier = Classifier::from_config(&config)?;
//!
//! let picture = image::load_image("pet.jpg")?;
//! let prediction = classifier.classify(&picture)?;
//! println!("{prediction}");
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod error;
pub mod image;
pub mod model;
pub mod pipeline;

pub use controller::{Controller, ModelState};
pub use error::{Error, Result};
pub use pipeline::{Classifier, Config, Floor, Label, Prediction};
