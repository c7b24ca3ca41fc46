// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Classification model loading and evaluation.
//!
//! [`InferenceEngine`] is the seam between the pipeline and whatever evaluates
//! the model. [`PlantClassifier`] is the ONNX Runtime implementation: the model
//! artifact is loaded once and the session stays resident for the lifetime of
//! the value.

use std::path::Path;

use ort::session::Session;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
#[cfg(feature = "coreml")]
use ort::execution_providers::CoreMLExecutionProvider;
use ort::value::TensorRef;

use crate::error::{HealifyError, Result};
use crate::inference::InferenceConfig;
use crate::preprocessing::InputTensor;
use crate::results::OutputVector;

/// Evaluates a classification model.
///
/// Implementations must be pure with respect to their input: the same tensor
/// always yields the same scores. Evaluation needs exclusive access, so the
/// pipeline serializes calls.
pub trait InferenceEngine: Send {
    /// Run the model on one input tensor.
    ///
    /// # Errors
    ///
    /// Returns [`HealifyError::InferenceError`] if evaluation fails.
    fn classify(&mut self, tensor: &InputTensor) -> Result<OutputVector>;
}

/// ONNX Runtime classifier for plant photos.
///
/// # Example
///
/// ```no_run
/// use healify::{InferenceEngine, PlantClassifier, preprocess};
///
/// let mut model = PlantClassifier::load("resnet_model.onnx")?;
/// let photo = image::open("leaf.jpg")?;
/// let scores = model.classify(&preprocess(&photo, 180)?)?;
/// println!("{} scores", scores.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct PlantClassifier {
    /// ONNX Runtime session.
    session: Session,
    /// Input tensor name.
    input_name: String,
    /// Output tensor name.
    output_name: String,
    /// Inference configuration.
    config: InferenceConfig,
}

impl PlantClassifier {
    /// Load a model from an ONNX file with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist or can't be loaded.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_config(path, InferenceConfig::default())
    }

    /// Load a model from an ONNX file.
    ///
    /// # Errors
    ///
    /// Returns [`HealifyError::ModelLoadError`] if the file is missing or is not
    /// a valid model, and [`HealifyError::ConfigError`] if the warm-up run
    /// produces a vector of the wrong width.
    pub fn load_with_config<P: AsRef<Path>>(path: P, config: InferenceConfig) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(HealifyError::ModelLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let session = Self::session_builder(&config)?
            .commit_from_file(path)
            .map_err(|e| HealifyError::ModelLoadError(format!("Failed to load model: {e}")))?;

        crate::verbose!("Loaded model {}", path.display());
        Self::from_session(session, config)
    }

    /// Load a model from an in-memory resource.
    ///
    /// # Errors
    ///
    /// Same as [`PlantClassifier::load_with_config`].
    pub fn from_memory(bytes: &[u8], config: InferenceConfig) -> Result<Self> {
        if bytes.is_empty() {
            return Err(HealifyError::ModelLoadError("Model resource is empty".to_string()));
        }

        let session = Self::session_builder(&config)?
            .commit_from_memory(bytes)
            .map_err(|e| HealifyError::ModelLoadError(format!("Failed to load model: {e}")))?;

        Self::from_session(session, config)
    }

    fn session_builder(config: &InferenceConfig) -> Result<SessionBuilder> {
        #[allow(unused_mut)]
        let mut builder = Session::builder().map_err(|e| {
            HealifyError::ModelLoadError(format!("Failed to create session builder: {e}"))
        })?;

        #[cfg(feature = "coreml")]
        {
            builder = builder
                .with_execution_providers([CoreMLExecutionProvider::default().build()])
                .map_err(|e| HealifyError::ModelLoadError(format!("Failed to register CoreML EP: {e}")))?;
        }

        builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| HealifyError::ModelLoadError(format!("Failed to set optimization level: {e}")))?
            .with_intra_threads(config.num_threads)
            .map_err(|e| HealifyError::ModelLoadError(format!("Failed to set intra-thread count: {e}")))
    }

    fn from_session(session: Session, config: InferenceConfig) -> Result<Self> {
        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| HealifyError::ModelLoadError("Model has no inputs".to_string()))?;
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| HealifyError::ModelLoadError("Model has no outputs".to_string()))?;

        let mut model = Self {
            session,
            input_name,
            output_name,
            config,
        };

        if model.config.warmup {
            model.warmup()?;
        }

        Ok(model)
    }

    /// Run one evaluation on an all-zero tensor and check the output width.
    ///
    /// # Errors
    ///
    /// Returns [`HealifyError::ConfigError`] if the model does not produce
    /// exactly `num_classes` scores, or the evaluation error itself.
    pub fn warmup(&mut self) -> Result<()> {
        let dummy = InputTensor::zeros(self.config.imgsz);
        let output = self.classify(&dummy)?;

        if output.len() != self.config.num_classes {
            return Err(HealifyError::ConfigError(format!(
                "Model produces {} scores, expected {}",
                output.len(),
                self.config.num_classes
            )));
        }

        crate::verbose!(
            "Model summary: input '{}' {}x{}x3, {} classes",
            self.input_name,
            self.config.imgsz,
            self.config.imgsz,
            output.len()
        );
        Ok(())
    }

}

impl InferenceEngine for PlantClassifier {
    fn classify(&mut self, tensor: &InputTensor) -> Result<OutputVector> {
        let input = tensor.as_array().as_standard_layout();

        let input_tensor = TensorRef::from_array_view(&input)
            .map_err(|e| HealifyError::InferenceError(format!("Failed to create input tensor: {e}")))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| HealifyError::InferenceError(format!("Inference failed: {e}")))?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            HealifyError::InferenceError(format!("Output '{}' not found", self.output_name))
        })?;

        let (_shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| HealifyError::InferenceError(format!("Failed to extract output: {e}")))?;

        Ok(OutputVector::from(data.to_vec()))
    }
}

impl std::fmt::Debug for PlantClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlantClassifier")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("imgsz", &self.config.imgsz)
            .field("num_classes", &self.config.num_classes)
            .finish()
    }
}
