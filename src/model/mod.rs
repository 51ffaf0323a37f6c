//! Model module for the CNN classifier using the Burn framework
//!
//! This module provides:
//! - The CNN architecture (`PlantClassifier`) and its configuration
//! - `BurnClassifier`, which adapts a loaded model to the inference engine
//! - Model bundles: validated directories of weights, labels and metadata
//!
//! The engine never sees a Burn type; everything past this module works on
//! plain `InputTensor` and `Vec<f32>` values.

pub mod bundle;
pub mod classifier;
pub mod cnn;

// Re-export main types for convenience
pub use bundle::{create_untrained, BundleManifest, ModelBundle};
pub use classifier::BurnClassifier;
pub use cnn::{PlantClassifier, PlantClassifierConfig};

/// Default base filter count for new bundles
pub const DEFAULT_BASE_FILTERS: usize = 32;

/// Default seed for `create_untrained`
pub const DEFAULT_SEED: u64 = 42;
