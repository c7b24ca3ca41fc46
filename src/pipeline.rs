// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! The photo → string classification pipeline.
//!
//! [`Pipeline`] owns the model engine, the label table and the decision policy.
//! It is built once per process and then called once per submitted photo:
//!
//! ```no_run
//! use healify::{InferenceConfig, Pipeline};
//!
//! let pipeline = Pipeline::load("assets/resnet_model.onnx", "assets", InferenceConfig::default())?;
//! let photo = image::open("leaf.jpg")?;
//! println!("{}", pipeline.classify_photo(&photo)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use image::DynamicImage;

use crate::error::{HealifyError, Result};
use crate::inference::InferenceConfig;
use crate::labels::{LabelTable, SupportedSet};
use crate::model::{InferenceEngine, PlantClassifier};
use crate::policy::{Decision, DecisionPolicy};
use crate::preprocessing::preprocess;
use crate::results::{OutputVector, Speed};

/// Text returned when model evaluation fails.
pub const PREDICTION_ERROR_MESSAGE: &str = "Error during prediction";

/// Full outcome of one classification.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// What the user is shown.
    pub decision: Decision,
    /// Raw model scores.
    pub output: OutputVector,
    /// Stage timings.
    pub speed: Speed,
}

impl Prediction {
    /// Indices of the five highest raw scores.
    #[must_use]
    pub fn top5(&self) -> Vec<usize> {
        self.output.top5()
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.decision.fmt(f)
    }
}

/// Preprocessor, engine and decision policy behind one call.
pub struct Pipeline<E = PlantClassifier> {
    engine: Mutex<E>,
    labels: LabelTable,
    policy: DecisionPolicy,
    config: InferenceConfig,
}

impl Pipeline<PlantClassifier> {
    /// Load the model and resolve the label table.
    ///
    /// # Errors
    ///
    /// Returns [`HealifyError::ConfigError`] if the label store cannot be listed
    /// or the model output width is wrong, and [`HealifyError::ModelLoadError`]
    /// if the model cannot be loaded.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        model: P,
        labels_dir: Q,
        config: InferenceConfig,
    ) -> Result<Self> {
        let labels = LabelTable::load(labels_dir)?;
        crate::verbose!("Loaded {} class names", labels.len());

        if labels.len() != config.num_classes {
            crate::warn!(
                "Label store has {} classes but the model outputs {}",
                labels.len(),
                config.num_classes
            );
        }

        let engine = PlantClassifier::load_with_config(model, config.clone())?;
        Ok(Self::new(engine, labels, config))
    }
}

impl<E: InferenceEngine> Pipeline<E> {
    /// Assemble a pipeline around an engine, using the curated remedy list.
    #[must_use]
    pub fn new(engine: E, labels: LabelTable, config: InferenceConfig) -> Self {
        let policy = DecisionPolicy::new(SupportedSet::default(), &config);
        Self {
            engine: Mutex::new(engine),
            labels,
            policy,
            config,
        }
    }

    /// Replace the decision policy.
    #[must_use]
    pub fn with_policy(mut self, policy: DecisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Class table shared by all calls.
    #[must_use]
    pub const fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Decision policy, including the rotation cursor.
    #[must_use]
    pub const fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    /// Pipeline configuration.
    #[must_use]
    pub const fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Classify one photo and keep the intermediate results.
    ///
    /// # Errors
    ///
    /// Propagates [`HealifyError::ImageError`] from preprocessing,
    /// [`HealifyError::InferenceError`] from the engine and
    /// [`HealifyError::ConfigError`] from the decision policy.
    pub fn predict(&self, image: &DynamicImage) -> Result<Prediction> {
        let start = Instant::now();
        let tensor = preprocess(image, self.config.imgsz)?;
        let preprocess_time = start.elapsed().as_secs_f64() * 1000.0;

        let start = Instant::now();
        let output = {
            // Engines keep no per-call state, so a poisoned lock is still usable.
            let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
            engine.classify(&tensor)?
        };
        let inference_time = start.elapsed().as_secs_f64() * 1000.0;

        let start = Instant::now();
        let decision = self.policy.decide(&output, &self.labels)?;
        let decision_time = start.elapsed().as_secs_f64() * 1000.0;

        if let Some((index, score)) = output.argmax() {
            crate::verbose!("Prediction confidence: {score:.4} for class index: {index}");
        }

        Ok(Prediction {
            decision,
            output,
            speed: Speed::new(preprocess_time, inference_time, decision_time),
        })
    }

    /// Classify one photo and return the string to show.
    ///
    /// An evaluation failure is reported as [`PREDICTION_ERROR_MESSAGE`]
    /// instead of an error, and does not advance the rotation.
    ///
    /// # Errors
    ///
    /// Returns [`HealifyError::ImageError`] for photos that cannot be
    /// preprocessed (the caller should ask for another one) and
    /// [`HealifyError::ConfigError`] for a model/label misconfiguration.
    pub fn classify_photo(&self, image: &DynamicImage) -> Result<String> {
        render(self.predict(image))
    }
}

impl<E: InferenceEngine + 'static> Pipeline<E> {
    /// Run [`Pipeline::predict`] on the blocking thread pool.
    ///
    /// Waits at most [`InferenceConfig::timeout`]. A timed-out evaluation keeps
    /// running in the background and still holds the engine until it ends.
    ///
    /// # Errors
    ///
    /// Returns [`HealifyError::Timeout`] when the limit expires, otherwise the
    /// same errors as [`Pipeline::predict`].
    pub async fn predict_async(self: Arc<Self>, image: DynamicImage) -> Result<Prediction> {
        let limit = self.config.timeout;
        let task = tokio::task::spawn_blocking(move || self.predict(&image));

        let joined = match limit {
            Some(limit) => tokio::time::timeout(limit, task)
                .await
                .map_err(|_| HealifyError::Timeout(limit))?,
            None => task.await,
        };

        joined.map_err(|e| HealifyError::InferenceError(format!("Classification task failed: {e}")))?
    }

    /// Background variant of [`Pipeline::classify_photo`].
    ///
    /// # Errors
    ///
    /// Returns [`HealifyError::Timeout`] when the limit expires, otherwise the
    /// same errors as [`Pipeline::classify_photo`].
    pub async fn classify_photo_async(self: Arc<Self>, image: DynamicImage) -> Result<String> {
        render(self.predict_async(image).await)
    }
}

fn render(prediction: Result<Prediction>) -> Result<String> {
    match prediction {
        Ok(prediction) => Ok(prediction.decision.to_string()),
        Err(HealifyError::InferenceError(msg)) => {
            crate::warn!("Error during inference: {msg}");
            Ok(PREDICTION_ERROR_MESSAGE.to_string())
        }
        Err(e) => Err(e),
    }
}

impl<E> fmt::Debug for Pipeline<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("num_labels", &self.labels.len())
            .field("cursor", &self.policy.cursor())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
