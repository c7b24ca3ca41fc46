// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]

//! # Healify
//!
//! Identify a medicinal plant from a photo and return a short description of its
//! remedies.
//!
//! A photo is resized to the model's square input, normalized into an RGB
//! tensor, scored by an ONNX classification model and turned into exactly one
//! user-facing string by a confidence-based decision policy.
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use healify::{InferenceConfig, Pipeline};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load the model and the class table once
//!     let pipeline = Pipeline::load("resnet_model.onnx", "assets", InferenceConfig::default())?;
//!
//!     // Then classify photos one at a time
//!     let photo = image::open("leaf.jpg")?;
//!     println!("{}", pipeline.classify_photo(&photo)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Classify a single photo
//! healify predict --model resnet_model.onnx --labels assets --source leaf.jpg
//!
//! # Classify a directory of photos, quietly
//! healify predict -m resnet_model.onnx -l assets -s photos/ --verbose false
//!
//! # Show the class table
//! healify labels --labels assets
//! ```
//!
//! ## Custom Configuration
//!
//! ```rust
//! use std::time::Duration;
//! use healify::InferenceConfig;
//!
//! let config = InferenceConfig::new()
//!     .with_imgsz(224)                                // Model input size
//!     .with_num_classes(38)                           // Output vector width
//!     .with_confidence(0.5)                           // Acceptance threshold
//!     .with_timeout(Some(Duration::from_secs(10)));   // Background call limit
//! assert_eq!(config.input_len(), 3 * 224 * 224);
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`labels`] | Class table ([`LabelTable`]) and curated remedies ([`SupportedSet`]) |
//! | [`preprocessing`] | Photo → [`InputTensor`] |
//! | [`model`] | [`InferenceEngine`] trait and the ONNX [`PlantClassifier`] |
//! | [`policy`] | [`DecisionPolicy`] and [`Decision`], including the fallback rotation |
//! | [`pipeline`] | [`Pipeline`] composing the stages behind one call |
//! | [`results`] | [`OutputVector`] and [`Speed`] |
//! | [`inference`] | [`InferenceConfig`] |
//! | [`source`] | Photo sources for the CLI ([`Source`], [`SourceIterator`]) |
//! | [`error`] | Error types ([`HealifyError`], [`Result`]) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `coreml` | Apple `CoreML` (macOS/iOS) |

// Modules
pub mod cli;
pub mod error;
pub mod inference;
pub mod labels;
pub mod model;
pub mod pipeline;
pub mod policy;
pub mod preprocessing;
pub mod results;
pub mod source;

// Re-export main types for convenience
pub use error::{HealifyError, Result};
pub use inference::InferenceConfig;
pub use labels::{LabelTable, SupportedSet};
pub use model::{InferenceEngine, PlantClassifier};
pub use pipeline::{PREDICTION_ERROR_MESSAGE, Pipeline, Prediction};
pub use policy::{Decision, DecisionPolicy, LOW_CONFIDENCE_MESSAGE};
pub use results::{OutputVector, Speed};
pub use source::{Source, SourceIterator, SourceMeta};

// Re-export preprocessing utilities
pub use preprocessing::{InputTensor, image_from_rgba, preprocess};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
