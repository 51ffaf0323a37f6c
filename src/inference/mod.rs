//! Inference module: preprocessing, model execution and decision logic
//!
//! This module provides:
//! - Deterministic image normalization to the classifier's input tensor
//! - A mutex-guarded engine around the single loaded classifier
//! - The confidence-gated decision that turns scores into a result
//!
//! Data flows strictly in that order; only the engine holds shared state.

pub mod decision;
pub mod engine;
pub mod preprocess;

// Re-export main types for convenience
pub use decision::{
    ClassificationDecision, ClassificationResult, ProbabilityVector, CONFIDENCE_THRESHOLD,
};
pub use engine::{Classifier, InferenceEngine};
pub use preprocess::{ImagePreprocessor, InputTensor, IMAGE_SIZE, INPUT_SHAPE};

/// Latency above which a single prediction is logged as slow (milliseconds)
pub const SLOW_INFERENCE_MS: f64 = 500.0;
