// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};

use crate::inference::{DEFAULT_CONFIDENCE, DEFAULT_IMGSZ, DEFAULT_NUM_CLASSES};

/// Default model artifact name.
pub const DEFAULT_MODEL: &str = "resnet_model.onnx";

/// Default label store directory.
pub const DEFAULT_LABELS: &str = "assets";

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Examples:
    healify predict --model resnet_model.onnx --labels assets --source leaf.jpg
    healify predict -m resnet_model.onnx -l assets -s photos/ --verbose false
    healify predict -m resnet_model.onnx -s "photos/*.png" --conf 0.5 --timeout 10
    healify labels --labels assets"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Identify the plant in one or more photos
    Predict(PredictArgs),
    /// Print the class table resolved from the label store
    Labels(LabelsArgs),
}

/// Arguments for the predict command.
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Path to ONNX model file
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Label store: one non-empty directory per class
    #[arg(short, long, default_value = DEFAULT_LABELS)]
    pub labels: String,

    /// Input source (image, directory, or glob such as photos/*.jpg)
    #[arg(short, long)]
    pub source: String,

    /// Model input size
    #[arg(long, default_value_t = DEFAULT_IMGSZ)]
    pub imgsz: u32,

    /// Number of classes the model outputs
    #[arg(long, default_value_t = DEFAULT_NUM_CLASSES)]
    pub classes: usize,

    /// Confidence threshold (inclusive)
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    pub conf: f32,

    /// Intra-op threads, 0 lets ONNX Runtime decide
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Per-photo timeout in seconds, 0 disables it
    #[arg(long, default_value_t = 30.0)]
    pub timeout: f64,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

/// Arguments for the labels command.
#[derive(Args, Debug)]
pub struct LabelsArgs {
    /// Label store: one non-empty directory per class
    #[arg(short, long, default_value = DEFAULT_LABELS)]
    pub labels: String,
}
