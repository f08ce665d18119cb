//! Inference engine abstraction and its ONNX Runtime backend.

use ort::session::Session;
use ort::value::TensorRef;

use crate::error::{Error, Result};
use crate::pipeline::{InputTensor, InputView, OutputVector, NUM_CLASSES};

/// Something that turns a filled input tensor into class probabilities.
pub trait InferenceEngine {
    /// Run one synchronous inference, overwriting `output` in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not completely filled, the engine
    /// fails, or the output does not have [`NUM_CLASSES`] values.
    fn infer(&mut self, input: &InputTensor, output: &mut OutputVector) -> Result<()>;
}

/// ONNX Runtime session for the bundled classifier.
pub struct OrtEngine {
    name: String,
    session: Session,
}

impl OrtEngine {
    /// Wrap a session that was loaded under `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, session: Session) -> Self {
        Self {
            name: name.into(),
            session,
        }
    }

    /// Name the model was loaded under, for logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl InferenceEngine for OrtEngine {
    fn infer(&mut self, input: &InputTensor, output: &mut OutputVector) -> Result<()> {
        let input_value = TensorRef::from_array_view(filled_view(input)?)
            .map_err(|source| Error::Inference { source })?;

        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(|source| Error::Inference { source })?;

        // Get first output
        let value = outputs
            .values()
            .next()
            .ok_or_else(|| Error::ShapeMismatch {
                expected: "class probability output".to_string(),
                actual: "no output".to_string(),
            })?;

        let (shape, data) = value
            .try_extract_tensor::<f32>()
            .map_err(|source| Error::Inference { source })?;
        let dims: Vec<i64> = shape.iter().copied().collect();

        read_output(&dims, data, output)?;
        tracing::debug!("{} output: {output:?}", self.name);

        Ok(())
    }
}

/// Borrow the input for the session, refusing a partly written buffer.
fn filled_view(input: &InputTensor) -> Result<InputView<'_>> {
    input.ensure_full()?;
    input.view()
}

/// Copy the model's output into `output`, which must receive exactly
/// [`NUM_CLASSES`] values. `output` is untouched on error.
fn read_output(dims: &[i64], data: &[f32], output: &mut OutputVector) -> Result<()> {
    if data.len() != NUM_CLASSES {
        return Err(Error::ShapeMismatch {
            expected: format!("[1, {NUM_CLASSES}]"),
            actual: format!("{dims:?}"),
        });
    }

    output.copy_from_slice(data);
    Ok(())
}
