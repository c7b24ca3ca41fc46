// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the classification pipeline.

use std::fmt;
use std::time::Duration;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, HealifyError>;

/// Main error type for the classification pipeline.
#[derive(Debug)]
pub enum HealifyError {
    /// The model artifact is missing or malformed.
    ModelLoadError(String),
    /// Label store, curated list or model output width is misconfigured.
    ConfigError(String),
    /// The supplied photo could not be decoded or resized.
    ImageError(String),
    /// Model evaluation failed.
    InferenceError(String),
    /// Background classification did not finish in time.
    Timeout(Duration),
    /// Wrapped `std::io::Error`.
    Io(std::io::Error),
}

impl HealifyError {
    /// Whether the error is fatal to startup (no point re-prompting the user).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ModelLoadError(_) | Self::ConfigError(_))
    }
}

impl fmt::Display for HealifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLoadError(msg) => write!(f, "Model load error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference error: {msg}"),
            Self::Timeout(after) => {
                write!(f, "Classification timed out after {:.1}s", after.as_secs_f64())
            }
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for HealifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for HealifyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for HealifyError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HealifyError::ModelLoadError("test".to_string());
        assert_eq!(err.to_string(), "Model load error: test");

        let err = HealifyError::InferenceError("test".to_string());
        assert_eq!(err.to_string(), "Inference error: test");

        let err = HealifyError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Classification timed out after 1.5s");
    }

    #[test]
    fn test_fatal_errors() {
        assert!(HealifyError::ConfigError(String::new()).is_fatal());
        assert!(HealifyError::ModelLoadError(String::new()).is_fatal());
        assert!(!HealifyError::ImageError(String::new()).is_fatal());
        assert!(!HealifyError::InferenceError(String::new()).is_fatal());
    }

    #[test]
    fn test_io_source() {
        use std::error::Error;

        let err = HealifyError::from(std::io::Error::other("disk"));
        assert!(err.source().is_some());
        assert!(HealifyError::ConfigError("x".into()).source().is_none());
    }
}
