// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Image preprocessing for plant classification.
//!
//! A photo of any size is stretched to the model's square input resolution
//! with a bilinear convolution filter and serialized pixel by pixel as
//! normalized `f32` values in R, G, B order. The resulting tensor has NHWC
//! layout `(1, S, S, 3)`.

#![allow(clippy::cast_possible_truncation)]

use image::{DynamicImage, GenericImageView, RgbaImage};
use ndarray::Array4;
use rayon::prelude::*;

use crate::error::{HealifyError, Result};

/// Number of color channels written per pixel.
pub const CHANNELS: usize = 3;

/// Normalized input tensor, shape `(1, S, S, 3)`, values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    data: Array4<f32>,
}

impl InputTensor {
    /// All-zero tensor for an `S×S` input, used for warm-up runs.
    #[must_use]
    pub fn zeros(size: u32) -> Self {
        let s = size as usize;
        Self {
            data: Array4::zeros((1, s, s, CHANNELS)),
        }
    }

    /// Total number of values (`3·S·S`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Underlying NHWC array.
    #[must_use]
    pub const fn as_array(&self) -> &Array4<f32> {
        &self.data
    }

    /// Values in row-major order, if the array is contiguous.
    #[must_use]
    pub fn as_slice(&self) -> Option<&[f32]> {
        self.data.as_slice()
    }
}

/// Preprocess a photo for classification.
///
/// # Arguments
///
/// * `image` - Input photo in any 8-bit color format. Alpha is ignored.
/// * `size` - Target square resolution `S`.
///
/// # Errors
///
/// Returns [`HealifyError::ImageError`] for zero-sized images or when resampling
/// fails, and [`HealifyError::ConfigError`] when `size` is zero.
pub fn preprocess(image: &DynamicImage, size: u32) -> Result<InputTensor> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(HealifyError::ImageError(format!(
            "Image has no pixels ({width}x{height})"
        )));
    }
    if size == 0 {
        return Err(HealifyError::ConfigError(
            "Model input size must be positive".to_string(),
        ));
    }

    let rgb = resize_exact(image, size)?;
    let data = rgb_to_tensor(&rgb, size)?;
    Ok(InputTensor { data })
}

/// Build a photo from a raw RGBA8 buffer.
///
/// # Errors
///
/// Returns [`HealifyError::ImageError`] if `pixels` is not `width * height * 4` bytes.
pub fn image_from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<DynamicImage> {
    let len = pixels.len();
    RgbaImage::from_raw(width, height, pixels)
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| {
            HealifyError::ImageError(format!(
                "Buffer of {len} bytes does not match {width}x{height} RGBA"
            ))
        })
}

/// Stretch `image` to `size×size` RGB8 with a bilinear convolution.
fn resize_exact(image: &DynamicImage, size: u32) -> Result<Vec<u8>> {
    use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};

    let (src_w, src_h) = image.dimensions();
    let src_rgb = image.to_rgb8();

    if src_w == size && src_h == size {
        return Ok(src_rgb.into_raw());
    }

    let src_image = Image::from_vec_u8(src_w, src_h, src_rgb.into_raw(), PixelType::U8x3)
        .map_err(|e| HealifyError::ImageError(format!("Failed to wrap source image: {e}")))?;
    let mut dst_image = Image::new(size, size, PixelType::U8x3);

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| HealifyError::ImageError(format!("Failed to resize image: {e}")))?;

    Ok(dst_image.into_vec())
}

/// Normalize an interleaved RGB8 buffer into an NHWC tensor.
fn rgb_to_tensor(rgb: &[u8], size: u32) -> Result<Array4<f32>> {
    let s = size as usize;
    let values: Vec<f32> = rgb.par_iter().map(|&v| f32::from(v) / 255.0).collect();

    Array4::from_shape_vec((1, s, s, CHANNELS), values)
        .map_err(|e| HealifyError::ImageError(format!("Unexpected pixel buffer size: {e}")))
}
