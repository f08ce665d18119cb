//! Classifier configuration and the prepare / infer / decide loop.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::image::RawImage;
use crate::model::{load_model, InferenceEngine, ModelCache, ModelSource, OrtEngine};

use super::decision::{Floor, OutputVector, Prediction, NUM_CLASSES};
use super::tensor::{prepare, InputTensor};

/// Configuration for the classifier.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Explicit model file. When unset the model is looked up in the model cache.
    pub model_path: Option<PathBuf>,

    /// Where to fetch the model from if it is not in the cache yet.
    pub model_url: Option<String>,

    /// Starting value for argmax. [`Floor::Zero`] treats all-non-positive
    /// outputs as "no class".
    pub floor: Floor,
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.model_path {
            if path.as_os_str().is_empty() {
                return Err(Error::InvalidParameter {
                    name: "model_path".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }

        if let Some(url) = &self.model_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::InvalidParameter {
                    name: "model_url".to_string(),
                    reason: "must be an http(s) URL".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Work out where the model comes from.
    ///
    /// An explicit path wins and must exist. Otherwise the model cache is
    /// consulted, downloading from `model_url` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if no model file can be found or fetched.
    pub fn model_source(&self) -> Result<ModelSource> {
        if let Some(path) = &self.model_path {
            if !path.is_file() {
                return Err(Error::ModelNotFound { path: path.clone() });
            }
            return Ok(ModelSource::File(path.clone()));
        }

        let cache = ModelCache::new()?;
        cache
            .resolve(self.model_url.as_deref())
            .map(ModelSource::File)
    }
}

/// Runs images through the model.
///
/// Owns a single input tensor and output vector that are reused for every
/// call to [`Classifier::classify`].
pub struct Classifier<E = OrtEngine> {
    engine: E,
    floor: Floor,
    input: InputTensor,
    output: OutputVector,
}

impl Classifier<OrtEngine> {
    /// Build a classifier backed by ONNX Runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the model cannot be
    /// found or loaded.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        tracing::info!("Initializing classifier with config: {config:?}");

        let engine = load_model(&config.model_source()?)?;

        tracing::info!("Model {} loaded", engine.name());

        Ok(Self::new(engine, config.floor))
    }
}

impl<E: InferenceEngine> Classifier<E> {
    /// Wrap an engine, allocating the input tensor and output vector once.
    #[must_use]
    pub fn new(engine: E, floor: Floor) -> Self {
        Self {
            engine,
            floor,
            input: InputTensor::new(),
            output: [0.0; NUM_CLASSES],
        }
    }

    /// Classify one image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be prepared or inference fails.
    pub fn classify(&mut self, image: &RawImage) -> Result<Prediction> {
        tracing::debug!("Classifying {}x{} image", image.width(), image.height());

        prepare(image, &mut self.input)?;
        self.engine.infer(&self.input, &mut self.output)?;

        let prediction = Prediction::decide(self.output, self.floor);
        match prediction.label {
            Some(label) => tracing::info!("Predicted {label} ({:?})", self.output),
            None => tracing::warn!("No class above floor ({:?})", self.output),
        }

        Ok(prediction)
    }

    /// Tensor as filled by the last call to [`Classifier::classify`].
    #[must_use]
    pub const fn input(&self) -> &InputTensor {
        &self.input
    }

    /// Starting value used for argmax.
    #[must_use]
    pub const fn floor(&self) -> Floor {
        self.floor
    }

    /// The engine predictions run on.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }
}
