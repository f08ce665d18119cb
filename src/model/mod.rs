//! Model location, loading and inference.

mod engine;
mod loader;

pub use engine::{InferenceEngine, OrtEngine};
pub use loader::{load_model, ModelCache, ModelSource, MODEL_FILENAME};
