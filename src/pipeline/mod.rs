//! Image classification pipeline: tensor preparation, inference, decision.

mod classify;
mod decision;
mod tensor;

pub use classify::{Classifier, Config};
pub use decision::{argmax, Floor, Label, OutputVector, Prediction, LABELS, NUM_CLASSES};
pub use tensor::{
    normalize_channel, pixel_to_rgb, prepare, serialize, InputTensor, InputView, BATCH_SIZE,
    INPUT_BYTES, INPUT_LEN,
};
