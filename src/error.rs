//! Custom error types for animal-classifier.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Main error type for the animal-classifier library.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to decode image bytes already in memory.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[source] image::ImageError),

    /// Image dimensions are not supported.
    #[error("unsupported image dimensions {width}x{height}: {reason}")]
    UnsupportedDimensions {
        width: u32,
        height: u32,
        reason: String,
    },

    /// No model file at the resolved location and nothing to download it from.
    #[error("model file not found at {path}")]
    ModelNotFound { path: PathBuf },

    /// Failed to download the model.
    #[error("failed to download model {name}: {source}")]
    ModelDownload {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    /// Failed to load an ONNX model.
    #[error("failed to load ONNX model {name}: {source}")]
    ModelLoad {
        name: String,
        #[source]
        source: ort::Error,
    },

    /// The model failed to load earlier, so nothing can be predicted.
    #[error("model unavailable")]
    ModelUnavailable {
        #[source]
        source: Arc<Error>,
    },

    /// Model inference failed.
    #[error("model inference failed: {source}")]
    Inference {
        #[source]
        source: ort::Error,
    },

    /// Shape mismatch between a tensor and what the model expects.
    #[error("tensor shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// A write went past the end of the input tensor.
    #[error("input tensor full: capacity is {capacity} values")]
    TensorOverflow { capacity: usize },

    /// The input tensor was handed to the engine before it was filled.
    #[error("input tensor incomplete: {written} of {capacity} values written")]
    TensorIncomplete { written: usize, capacity: usize },

    /// Predict was requested before any image was chosen.
    #[error("no image selected")]
    NoImageSelected,

    /// Failed to create the model directory.
    #[error("failed to create model directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for animal-classifier operations.
pub type Result<T> = std::result::Result<T, Error>;
