// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Command-line front end.
//!
//! This module contains argument parsing, the console output macros and the
//! `predict` and `labels` command implementations.

// Modules
/// CLI arguments.
pub mod args;

/// Console output.
pub mod logging;

/// Prediction logic.
pub mod predict;
