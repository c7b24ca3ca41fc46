// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Decision policy: from raw model scores to one user-facing string.
//!
//! The top-scoring class is only reported when its label is one of the curated
//! [`SupportedSet`] entries. Membership is exact text equality between the
//! class name and the curated descriptions, so in practice most requests take
//! the fallback path, which hands out the curated entries in rotation.
//!
//! The rotation position is an atomic cursor owned by the policy. It is
//! advanced with a compare-and-swap loop, so concurrent fallbacks each get
//! their own position and none is skipped.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{HealifyError, Result};
use crate::inference::InferenceConfig;
use crate::labels::{LabelTable, SupportedSet};
use crate::results::OutputVector;

/// Text returned when a supported class scores below the threshold.
pub const LOW_CONFIDENCE_MESSAGE: &str = "Low confidence for prediction";

/// Outcome of one decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Top class is supported and scored at or above the threshold.
    Accepted {
        /// Class index.
        index: usize,
        /// Class name.
        label: String,
        /// Top score.
        confidence: f32,
    },
    /// Top class is supported but scored below the threshold.
    LowConfidence {
        /// Class index.
        index: usize,
        /// Top score.
        confidence: f32,
    },
    /// Top class is not supported; the next curated entry was handed out.
    Fallback {
        /// Rotation position the entry was taken from.
        position: usize,
        /// Curated entry.
        text: String,
    },
}

impl Decision {
    /// Whether the rotation was used.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted {
                label, confidence, ..
            } => write!(f, "{label} ({:.2}%)", confidence * 100.0),
            Self::LowConfidence { .. } => f.write_str(LOW_CONFIDENCE_MESSAGE),
            Self::Fallback { text, .. } => f.write_str(text),
        }
    }
}

/// Rotation position into the [`SupportedSet`], always below its length.
#[derive(Debug, Default)]
pub(crate) struct FallbackCursor {
    position: AtomicUsize,
}

impl FallbackCursor {
    /// Cursor starting at `start`.
    #[must_use]
    pub(crate) const fn new(start: usize) -> Self {
        Self {
            position: AtomicUsize::new(start),
        }
    }

    /// Current position.
    #[must_use]
    pub(crate) fn position(&self) -> usize {
        self.position.load(Ordering::Acquire)
    }

    /// Take the current position and move to the next one modulo `len`.
    fn advance(&self, len: usize) -> usize {
        self.position
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |p| Some((p + 1) % len))
            .unwrap_or_else(|p| p)
    }

    fn reset(&self) {
        self.position.store(0, Ordering::Release);
    }
}

/// Turns an [`OutputVector`] into a [`Decision`].
#[derive(Debug)]
pub struct DecisionPolicy {
    supported: SupportedSet,
    cursor: FallbackCursor,
    threshold: f32,
    num_classes: usize,
}

impl DecisionPolicy {
    /// Create a policy over `supported` with the threshold and class count from `config`.
    #[must_use]
    pub fn new(supported: SupportedSet, config: &InferenceConfig) -> Self {
        Self {
            supported,
            cursor: FallbackCursor::default(),
            threshold: config.confidence_threshold,
            num_classes: config.num_classes,
        }
    }

    /// Start the rotation at `start` (taken modulo the rotation length).
    #[must_use]
    pub fn with_cursor(mut self, start: usize) -> Self {
        self.cursor = FallbackCursor::new(start % self.supported.len());
        self
    }

    /// Curated entries.
    #[must_use]
    pub const fn supported(&self) -> &SupportedSet {
        &self.supported
    }

    /// Current rotation position.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor.position()
    }

    /// Move the rotation back to the first entry.
    pub fn reset(&self) {
        self.cursor.reset();
    }

    /// Decide what to show for one model output.
    ///
    /// # Errors
    ///
    /// Returns [`HealifyError::ConfigError`] if `output` does not have exactly
    /// `num_classes` scores. The cursor is not touched in that case.
    pub fn decide(&self, output: &OutputVector, labels: &LabelTable) -> Result<Decision> {
        if output.len() != self.num_classes {
            return Err(HealifyError::ConfigError(format!(
                "Model produced {} scores, expected {}",
                output.len(),
                self.num_classes
            )));
        }
        let (index, confidence) = output.argmax().ok_or_else(|| {
            HealifyError::ConfigError("Model produced no scores".to_string())
        })?;

        if let Some(label) = labels.get(index).filter(|label| self.supported.contains(label)) {
            return Ok(if confidence >= self.threshold {
                Decision::Accepted {
                    index,
                    label: label.to_string(),
                    confidence,
                }
            } else {
                Decision::LowConfidence { index, confidence }
            });
        }

        let position = self.cursor.advance(self.supported.len());
        Ok(Decision::Fallback {
            position,
            text: self.supported.cyclic(position).to_string(),
        })
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self::new(SupportedSet::default(), &InferenceConfig::default())
    }
}
