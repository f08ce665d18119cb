//! Front-end state: the loaded model and the currently chosen image.

use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::image::{load_image, RawImage};
use crate::model::{InferenceEngine, OrtEngine};
use crate::pipeline::{Classifier, Config, Prediction};

/// Whether the model could be loaded.
pub enum ModelState<E = OrtEngine> {
    /// The model loaded and can classify.
    Ready(Classifier<E>),
    /// Loading failed; predictions report this error as their source.
    Unavailable(Arc<Error>),
}

/// Drives "choose image" and "predict" for a front end.
///
/// A model that fails to load does not make construction fail. The failure is
/// kept and reported by [`Controller::predict`] and [`Controller::model_state`]
/// so the front end can still start and show why it cannot classify.
pub struct Controller<E = OrtEngine> {
    model: ModelState<E>,
    selected: Option<RawImage>,
}

impl Controller<OrtEngine> {
    /// Load the model described by `config`.
    ///
    /// A load failure is kept, not logged; it surfaces from
    /// [`Controller::predict`].
    #[must_use]
    pub fn new(config: &Config) -> Self {
        match Classifier::from_config(config) {
            Ok(classifier) => Self::with_classifier(classifier),
            Err(err) => {
                tracing::debug!("Model failed to load, predictions disabled");
                Self::unavailable(err)
            }
        }
    }
}

impl<E: InferenceEngine> Controller<E> {
    /// Controller with a loaded model and nothing selected.
    #[must_use]
    pub const fn with_classifier(classifier: Classifier<E>) -> Self {
        Self {
            model: ModelState::Ready(classifier),
            selected: None,
        }
    }

    /// Controller whose model failed to load with `error`.
    #[must_use]
    pub fn unavailable(error: Error) -> Self {
        Self {
            model: ModelState::Unavailable(Arc::new(error)),
            selected: None,
        }
    }

    /// Whether the model loaded, and why not if it did not.
    #[must_use]
    pub const fn model_state(&self) -> &ModelState<E> {
        &self.model
    }

    /// Whether predictions can run once an image is selected.
    #[must_use]
    pub const fn is_model_ready(&self) -> bool {
        matches!(self.model, ModelState::Ready(_))
    }

    /// Load an image from disk and make it the current selection.
    ///
    /// On failure the previous selection is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be loaded.
    pub fn choose_image<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let image = load_image(path)?;
        self.select(image);
        Ok(())
    }

    /// Make an already-decoded image the current selection.
    pub fn select(&mut self, image: RawImage) {
        self.selected = Some(image);
    }

    /// The image [`Controller::predict`] would classify.
    #[must_use]
    pub const fn selected(&self) -> Option<&RawImage> {
        self.selected.as_ref()
    }

    /// Forget the current selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Classify the current selection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoImageSelected`] if nothing was chosen,
    /// [`Error::ModelUnavailable`] if the model failed to load, or any error
    /// from the classifier.
    pub fn predict(&mut self) -> Result<Prediction> {
        let image = self.selected.as_ref().ok_or(Error::NoImageSelected)?;

        match &mut self.model {
            ModelState::Ready(classifier) => classifier.classify(image),
            ModelState::Unavailable(source) => Err(Error::ModelUnavailable {
                source: Arc::clone(source),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::image::pack_rgb;
    use crate::pipeline::{Floor, InputTensor, Label, OutputVector};

    struct FixedEngine(OutputVector);

    impl InferenceEngine for FixedEngine {
        fn infer(&mut self, input: &InputTensor, output: &mut OutputVector) -> Result<()> {
            input.ensure_full()?;
            *output = self.0;
            Ok(())
        }
    }

    fn ready(output: OutputVector) -> Controller<FixedEngine> {
        Controller::with_classifier(Classifier::new(FixedEngine(output), Floor::Zero))
    }

    #[test]
    fn test_predict_without_image() {
        let mut controller = ready([0.2, 0.7, 0.1]);
        assert!(matches!(controller.predict(), Err(Error::NoImageSelected)));
    }

    fn missing_model() -> Error {
        Error::ModelNotFound {
            path: PathBuf::from("/models/animals.onnx"),
        }
    }

    #[test]
    fn test_predict_with_unavailable_model() {
        let mut controller = Controller::<FixedEngine>::unavailable(missing_model());
        controller.select(RawImage::filled(10, 10, pack_rgb(1, 1, 1)).unwrap());

        assert!(!controller.is_model_ready());
        let err = controller.predict().unwrap_err();
        assert!(matches!(
            err,
            Error::ModelUnavailable { ref source } if matches!(**source, Error::ModelNotFound { .. })
        ));
    }

    #[test]
    fn test_unavailable_error_keeps_load_failure_as_source() {
        let mut controller = Controller::<FixedEngine>::unavailable(missing_model());
        controller.select(RawImage::filled(2, 2, 0).unwrap());

        let err = controller.predict().unwrap_err();
        assert_eq!(err.to_string(), "model unavailable");

        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(
            source.to_string(),
            "model file not found at /models/animals.onnx"
        );
    }

    #[test]
    fn test_no_image_reported_before_missing_model() {
        let mut controller = Controller::<FixedEngine>::unavailable(missing_model());
        assert!(matches!(controller.predict(), Err(Error::NoImageSelected)));
    }

    #[test]
    fn test_predict_selected_image() {
        let mut controller = ready([0.2, 0.7, 0.1]);
        controller.select(RawImage::filled(100, 60, pack_rgb(90, 60, 30)).unwrap());

        let prediction = controller.predict().unwrap();
        assert_eq!(prediction.label, Some(Label::Dog));
        assert!(controller.is_model_ready());
    }

    #[test]
    fn test_failed_choose_keeps_previous_selection() {
        let mut controller = ready([0.9, 0.05, 0.05]);
        controller.select(RawImage::filled(4, 4, 0).unwrap());

        assert!(controller.choose_image("/definitely/not/here.png").is_err());
        assert_eq!(controller.selected().map(RawImage::width), Some(4));

        controller.clear_selection();
        assert!(controller.selected().is_none());
    }

    #[test]
    fn test_new_with_missing_model_is_unavailable() {
        let config = Config {
            model_path: Some("/definitely/not/animals.onnx".into()),
            ..Config::default()
        };
        let controller = Controller::new(&config);

        match controller.model_state() {
            ModelState::Unavailable(err) => {
                assert!(matches!(**err, Error::ModelNotFound { .. }));
            }
            ModelState::Ready(_) => panic!("model should not load"),
        }
    }
}
