//! Image Preprocessing Module
//!
//! Turns arbitrary input images into the fixed `[1, 224, 224, 3]` tensor the
//! classifier was trained on:
//!
//! 1. decode, then convert any color mode (grayscale, RGBA, palette, 16-bit)
//!    to 8-bit RGB *before* resizing
//! 2. bilinear resize to 224x224 with half-pixel centres and no
//!    antialiasing, computed in floating point (the training pipeline used
//!    `tf.image.resize`; a different kernel silently shifts the input
//!    distribution)
//! 3. divide by 255 so every value lies in [0, 1]
//!
//! Layout is NHWC, row-major. The whole transform is deterministic.

use std::path::Path;

use image::{DynamicImage, RgbImage};

use crate::utils::error::{PlantDocError, Result};

/// Spatial size expected by the classifier
pub const IMAGE_SIZE: usize = 224;

/// Color channels expected by the classifier
pub const CHANNELS: usize = 3;

/// Full input shape: batch, height, width, channels
pub const INPUT_SHAPE: [usize; 4] = [1, IMAGE_SIZE, IMAGE_SIZE, CHANNELS];

/// A normalized image batch in NHWC layout
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    data: Vec<f32>,
    shape: [usize; 4],
}

impl InputTensor {
    /// Wrap raw values, checking they fill the shape exactly
    pub fn from_vec(data: Vec<f32>, shape: [usize; 4]) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(PlantDocError::Inference(format!(
                "tensor data has {} values but shape {:?} needs {}",
                data.len(),
                shape,
                expected
            )));
        }
        Ok(Self { data, shape })
    }

    /// All-zero input of the classifier's shape (used for startup probes)
    pub fn zeros() -> Self {
        Self {
            data: vec![0.0; INPUT_SHAPE.iter().product()],
            shape: INPUT_SHAPE,
        }
    }

    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Value at (batch, row, column, channel)
    pub fn get(&self, n: usize, y: usize, x: usize, c: usize) -> Option<f32> {
        let [batch, height, width, channels] = self.shape;
        if n >= batch || y >= height || x >= width || c >= channels {
            return None;
        }
        let offset = ((n * height + y) * width + x) * channels + c;
        self.data.get(offset).copied()
    }
}

/// Converts input images into classifier-ready tensors
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePreprocessor;

impl ImagePreprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Expected output shape
    pub fn output_shape(&self) -> [usize; 4] {
        INPUT_SHAPE
    }

    /// Decode encoded image bytes (PNG, JPEG, ...) and normalize them
    pub fn normalize_bytes(&self, bytes: &[u8]) -> Result<InputTensor> {
        if bytes.is_empty() {
            return Err(PlantDocError::InvalidImage("empty input".to_string()));
        }
        let image = image::load_from_memory(bytes)?;
        self.normalize(&image)
    }

    /// Load an image from disk and normalize it
    pub fn normalize_file(&self, path: &Path) -> Result<InputTensor> {
        let image = image::open(path).map_err(|e| {
            PlantDocError::InvalidImage(format!("failed to load {}: {}", path.display(), e))
        })?;
        self.normalize(&image)
    }

    /// Normalize an already decoded image
    pub fn normalize(&self, image: &DynamicImage) -> Result<InputTensor> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PlantDocError::InvalidImage(format!(
                "image has zero size ({}x{})",
                image.width(),
                image.height()
            )));
        }

        // Color conversion first so the channel count is fixed before resizing
        let rgb = image.to_rgb8();
        let mut data = resize_bilinear(&rgb, IMAGE_SIZE, IMAGE_SIZE);
        for value in &mut data {
            *value /= 255.0;
        }

        InputTensor::from_vec(data, INPUT_SHAPE)
    }
}

/// Source sampling position for one output coordinate
#[derive(Debug, Clone, Copy)]
struct Sample {
    lower: usize,
    upper: usize,
    lerp: f32,
}

fn sample_positions(in_size: usize, out_size: usize) -> Vec<Sample> {
    let scale = in_size as f32 / out_size as f32;
    let last = in_size - 1;

    (0..out_size)
        .map(|i| {
            let src = (i as f32 + 0.5) * scale - 0.5;
            let floor = src.floor();
            Sample {
                lower: (floor.max(0.0) as usize).min(last),
                upper: (src.ceil().max(0.0) as usize).min(last),
                lerp: src - floor,
            }
        })
        .collect()
}

/// Bilinear resize to NHWC floats in the 0..=255 range
fn resize_bilinear(src: &RgbImage, out_width: usize, out_height: usize) -> Vec<f32> {
    let in_width = src.width() as usize;
    let raw = src.as_raw();

    let xs = sample_positions(in_width, out_width);
    let ys = sample_positions(src.height() as usize, out_height);

    let pixel =
        |row: usize, col: usize, c: usize| raw[(row * in_width + col) * CHANNELS + c] as f32;

    let mut out = Vec::with_capacity(out_width * out_height * CHANNELS);
    for y in &ys {
        for x in &xs {
            for c in 0..CHANNELS {
                let top_left = pixel(y.lower, x.lower, c);
                let top_right = pixel(y.lower, x.upper, c);
                let bottom_left = pixel(y.upper, x.lower, c);
                let bottom_right = pixel(y.upper, x.upper, c);

                let top = top_left + (top_right - top_left) * x.lerp;
                let bottom = bottom_left + (bottom_right - bottom_left) * x.lerp;
                out.push(top + (bottom - top) * y.lerp);
            }
        }
    }

    out
}
