// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Inference configuration.
//!
//! This module defines the [`InferenceConfig`] struct, which controls the fixed
//! model geometry (input resolution and class count), the acceptance threshold
//! used by the decision policy, and runtime options such as the ONNX Runtime
//! thread count and the background classification timeout.

use std::time::Duration;

/// Default model input resolution (the photo is resized to `S×S`).
pub const DEFAULT_IMGSZ: u32 = 180;

/// Default number of model output classes.
pub const DEFAULT_NUM_CLASSES: usize = 164;

/// Default confidence threshold for accepting the top class.
pub const DEFAULT_CONFIDENCE: f32 = 0.30;

/// Default timeout for background classification.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the classification pipeline.
///
/// # Example
///
/// ```rust
/// use healify::InferenceConfig;
///
/// let config = InferenceConfig::new()
///     .with_imgsz(180)
///     .with_num_classes(164)
///     .with_confidence(0.3);
/// ```
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Square input resolution `S` of the model.
    pub imgsz: u32,
    /// Width `C` of the model output vector.
    pub num_classes: usize,
    /// Minimum top score for the accept branch (inclusive).
    pub confidence_threshold: f32,
    /// Number of intra-op threads for ONNX Runtime.
    /// Setting this to `0` allows ONNX Runtime to choose.
    pub num_threads: usize,
    /// Upper bound on a background classification. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Run one dummy evaluation right after loading the model.
    pub warmup: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            imgsz: DEFAULT_IMGSZ,
            num_classes: DEFAULT_NUM_CLASSES,
            confidence_threshold: DEFAULT_CONFIDENCE,
            num_threads: 0,
            timeout: Some(DEFAULT_TIMEOUT),
            warmup: true,
        }
    }
}

impl InferenceConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the square input resolution.
    #[must_use]
    pub const fn with_imgsz(mut self, size: u32) -> Self {
        self.imgsz = size;
        self
    }

    /// Set the expected width of the model output.
    #[must_use]
    pub const fn with_num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = num_classes;
        self
    }

    /// Set the confidence threshold.
    ///
    /// A top score greater than or equal to `threshold` is accepted.
    #[must_use]
    pub const fn with_confidence(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the number of threads for inference.
    ///
    /// # Arguments
    ///
    /// * `threads` - The number of intra-op threads. Set to `0` for auto-configuration.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Set (or clear) the background classification timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable the warm-up evaluation after loading.
    #[must_use]
    pub const fn with_warmup(mut self, warmup: bool) -> Self {
        self.warmup = warmup;
        self
    }

    /// Number of `f32` values in one input tensor (`3·S·S`).
    #[must_use]
    pub const fn input_len(&self) -> usize {
        3 * self.imgsz as usize * self.imgsz as usize
    }
}
