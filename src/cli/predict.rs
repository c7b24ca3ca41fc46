// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::args::{LabelsArgs, PredictArgs};
use crate::source::{Source, SourceIterator};
use crate::{
    HealifyError, InferenceConfig, LabelTable, PREDICTION_ERROR_MESSAGE, Pipeline, Prediction,
    VERSION,
};
use crate::{error, info, section, success, verbose, warn};

/// Classify every photo of the source and print one line per photo.
#[allow(clippy::cast_precision_loss)]
pub async fn run_prediction(args: &PredictArgs) {
    let config = match build_config(args) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            process::exit(2);
        }
    };

    let pipeline = match Pipeline::load(&args.model, &args.labels, config) {
        Ok(pipeline) => Arc::new(pipeline),
        Err(e) => {
            error!("Error loading model: {e}");
            process::exit(1);
        }
    };

    let iter = match SourceIterator::new(Source::from(args.source.as_str())) {
        Ok(iter) => iter,
        Err(e) => {
            error!("Error reading source: {e}");
            process::exit(1);
        }
    };

    let config = pipeline.config();
    let provider = if cfg!(feature = "coreml") { "CoreML" } else { "CPU" };
    println!("Healify {VERSION} 🌿 Rust ONNX {provider}");
    verbose!(
        "Model {}: {} classes, imgsz=({}, {}), conf={:.2}",
        args.model,
        pipeline.labels().len(),
        config.imgsz,
        config.imgsz,
        config.confidence_threshold
    );
    section!("Results");

    let total = iter.total();
    let mut classified = 0usize;
    let mut total_preprocess = 0.0;
    let mut total_inference = 0.0;
    let mut total_decision = 0.0;

    for item in iter {
        let (img, meta) = match item {
            Ok(val) => val,
            Err(e) => {
                warn!("Skipping photo: {e}");
                continue;
            }
        };

        match Arc::clone(&pipeline).predict_async(img).await {
            Ok(prediction) => {
                success!("{}/{} {}: {prediction}", meta.index + 1, total, meta.path);
                verbose!("    top5: {}", format_top5(&prediction, pipeline.labels()));
                total_preprocess += prediction.speed.preprocess.unwrap_or(0.0);
                total_inference += prediction.speed.inference.unwrap_or(0.0);
                total_decision += prediction.speed.decision.unwrap_or(0.0);
                classified += 1;
            }
            Err(HealifyError::InferenceError(msg)) => {
                warn!("Error during inference: {msg}");
                info!("{}/{} {}: {PREDICTION_ERROR_MESSAGE}", meta.index + 1, total, meta.path);
            }
            Err(e) if e.is_fatal() => {
                error!("{e}");
                process::exit(1);
            }
            Err(e) => {
                warn!("Skipping {}: {e}", meta.path);
            }
        }
    }

    if classified == 0 {
        warn!("No photos were classified");
        return;
    }

    let n = classified as f64;
    verbose!(
        "Speed: {:.1}ms preprocess, {:.1}ms inference, {:.1}ms decision per photo at shape (1, {}, {}, 3)",
        total_preprocess / n,
        total_inference / n,
        total_decision / n,
        config.imgsz,
        config.imgsz
    );
}

/// Print the class table with its indices.
pub fn run_labels(args: &LabelsArgs) {
    let labels = match LabelTable::load(&args.labels) {
        Ok(labels) => labels,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    for (index, name) in labels.iter() {
        println!("{index:>4}  {name}");
    }
    verbose!("{} classes in {}", labels.len(), args.labels);
}

fn build_config(args: &PredictArgs) -> crate::Result<InferenceConfig> {
    if !(0.0..=1.0).contains(&args.conf) {
        return Err(HealifyError::ConfigError(format!(
            "--conf must be within [0, 1], got {}",
            args.conf
        )));
    }

    let timeout = if args.timeout > 0.0 {
        let limit = Duration::try_from_secs_f64(args.timeout)
            .map_err(|e| HealifyError::ConfigError(format!("Invalid --timeout: {e}")))?;
        Some(limit)
    } else {
        None
    };

    Ok(InferenceConfig::new()
        .with_imgsz(args.imgsz)
        .with_num_classes(args.classes)
        .with_confidence(args.conf)
        .with_threads(args.threads)
        .with_timeout(timeout))
}

/// Format the best raw scores like "Neem 0.91, Tulsi 0.04".
fn format_top5(prediction: &Prediction, labels: &LabelTable) -> String {
    prediction
        .top5()
        .iter()
        .map(|&i| {
            let name = labels.get(i).unwrap_or("unknown");
            format!("{name} {:.2}", prediction.output.data[i])
        })
        .collect::<Vec<_>>()
        .join(", ")
}
