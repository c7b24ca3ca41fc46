// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Integration tests for the classification pipeline

use std::fs;
use std::path::Path;
use std::sync::Arc;

use healify::labels::{ALOE_VERA, CURATED_REMEDIES, NEEM};
use healify::{
    DecisionPolicy, HealifyError, InferenceConfig, InferenceEngine, InputTensor, LOW_CONFIDENCE_MESSAGE,
    LabelTable, OutputVector, PREDICTION_ERROR_MESSAGE, Pipeline, Source, SourceIterator, SupportedSet,
    image_from_rgba,
};
use image::{DynamicImage, Rgb, RgbImage};
use tempfile::TempDir;

const IMGSZ: u32 = 16;

/// Scores the mean red value of the tensor into one of three buckets.
struct ColorEngine;

impl InferenceEngine for ColorEngine {
    fn classify(&mut self, tensor: &InputTensor) -> healify::Result<OutputVector> {
        let data = tensor
            .as_slice()
            .ok_or_else(|| HealifyError::InferenceError("tensor not contiguous".to_string()))?;
        let reds: Vec<f32> = data.iter().step_by(3).copied().collect();
        #[allow(clippy::cast_precision_loss)]
        let mean = reds.iter().sum::<f32>() / reds.len() as f32;

        let mut scores = vec![0.05; 3];
        let winner = if mean > 0.66 {
            2
        } else if mean > 0.33 {
            1
        } else {
            0
        };
        scores[winner] = 0.9;
        Ok(OutputVector::from(scores))
    }
}

fn config() -> InferenceConfig {
    InferenceConfig::new().with_imgsz(IMGSZ).with_num_classes(3)
}

fn label_store(root: &Path) {
    for name in ["Tulsi", "Aloe Vera", "Neem"] {
        let dir = root.join(name);
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("sample.jpg"), b"jpeg").unwrap();
    }
}

fn photo(red: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([red, 100, 50])))
}

#[test]
fn test_directory_labels_fall_back_in_rotation() {
    let tmp = TempDir::new().unwrap();
    label_store(tmp.path());

    let labels = LabelTable::load(tmp.path()).unwrap();
    assert_eq!(labels.names(), ["Aloe Vera", "Neem", "Tulsi"]);

    // Raw class names never match the curated descriptions.
    let pipeline = Pipeline::new(ColorEngine, labels, config());
    let outputs: Vec<String> = [10, 128, 250, 10, 128, 250, 10, 128]
        .iter()
        .map(|&red| pipeline.classify_photo(&photo(red)).unwrap())
        .collect();

    let expected: Vec<&str> = CURATED_REMEDIES.iter().cycle().take(8).copied().collect();
    assert_eq!(outputs, expected);
}

#[test]
fn test_descriptive_labels_are_accepted() {
    let labels = LabelTable::from_names([ALOE_VERA, NEEM, "Basil"]);
    let pipeline = Pipeline::new(ColorEngine, labels, config());

    assert_eq!(
        pipeline.classify_photo(&photo(10)).unwrap(),
        format!("{ALOE_VERA} (90.00%)")
    );
    assert_eq!(
        pipeline.classify_photo(&photo(128)).unwrap(),
        format!("{NEEM} (90.00%)")
    );
    assert_eq!(pipeline.policy().cursor(), 0);

    assert_eq!(pipeline.classify_photo(&photo(250)).unwrap(), CURATED_REMEDIES[0]);
    assert_eq!(pipeline.policy().cursor(), 1);
}

#[test]
fn test_threshold_from_config() {
    let labels = LabelTable::from_names([ALOE_VERA, NEEM, "Basil"]);
    let strict = config().with_confidence(0.95);
    let pipeline = Pipeline::new(ColorEngine, labels, strict);

    assert_eq!(pipeline.classify_photo(&photo(10)).unwrap(), LOW_CONFIDENCE_MESSAGE);
    assert_eq!(pipeline.policy().cursor(), 0);
}

#[test]
fn test_custom_supported_set() {
    let supported = SupportedSet::new(["first", "second"]).unwrap();
    let policy = DecisionPolicy::new(supported, &config()).with_cursor(1);
    let pipeline = Pipeline::new(ColorEngine, LabelTable::from_names(["a", "b", "c"]), config())
        .with_policy(policy);

    assert_eq!(pipeline.classify_photo(&photo(10)).unwrap(), "second");
    assert_eq!(pipeline.classify_photo(&photo(10)).unwrap(), "first");

    pipeline.policy().reset();
    assert_eq!(pipeline.classify_photo(&photo(10)).unwrap(), "first");
}

#[test]
fn test_rgba_photo_from_buffer() {
    let pixels: Vec<u8> = [250, 0, 0, 0].repeat(20 * 20);
    let img = image_from_rgba(20, 20, pixels).unwrap();
    let labels = LabelTable::from_names(["a", "b", ALOE_VERA]);
    let pipeline = Pipeline::new(ColorEngine, labels, config());

    // Alpha is dropped, red dominates.
    assert_eq!(pipeline.classify_photo(&img).unwrap(), format!("{ALOE_VERA} (90.00%)"));
    assert!(image_from_rgba(20, 20, vec![0; 10]).is_err());
}

#[test]
fn test_source_directory_through_pipeline() {
    let tmp = TempDir::new().unwrap();
    for (name, red) in [("b.png", 250), ("a.png", 10), ("c.png", 128)] {
        RgbImage::from_pixel(8, 8, Rgb([red, 0, 0]))
            .save(tmp.path().join(name))
            .unwrap();
    }

    let labels = LabelTable::from_names([ALOE_VERA, NEEM, "Basil"]);
    let pipeline = Pipeline::new(ColorEngine, labels, config());

    let outputs: Vec<String> = SourceIterator::new(Source::from(tmp.path().to_path_buf()))
        .unwrap()
        .map(|item| pipeline.classify_photo(&item.unwrap().0).unwrap())
        .collect();

    assert_eq!(
        outputs,
        [
            format!("{ALOE_VERA} (90.00%)"),
            NEEM.to_string(),
            format!("{NEEM} (90.00%)"),
        ]
    );
}

#[tokio::test]
async fn test_concurrent_async_calls_share_rotation() {
    let pipeline = Arc::new(Pipeline::new(
        ColorEngine,
        LabelTable::from_names(["a", "b", "c"]),
        config(),
    ));

    let handles: Vec<_> = (0..CURATED_REMEDIES.len())
        .map(|_| tokio::spawn(Arc::clone(&pipeline).classify_photo_async(photo(10))))
        .collect();

    let mut outputs = Vec::new();
    for handle in handles {
        outputs.push(handle.await.unwrap().unwrap());
    }

    assert!(outputs.iter().all(|text| text != PREDICTION_ERROR_MESSAGE));
    assert_eq!(pipeline.policy().cursor(), 0);

    let mut got = outputs.clone();
    let mut expected: Vec<String> = CURATED_REMEDIES.iter().map(|s| (*s).to_string()).collect();
    got.sort();
    expected.sort();
    assert_eq!(got, expected);
}

#[test]
fn test_missing_model_is_fatal() {
    let tmp = TempDir::new().unwrap();
    label_store(tmp.path());

    let err = Pipeline::load(tmp.path().join("missing.onnx"), tmp.path(), config()).unwrap_err();
    assert!(matches!(err, HealifyError::ModelLoadError(_)));
    assert!(err.is_fatal());
}
