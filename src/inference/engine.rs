//! Inference Engine Module
//!
//! Owns the single loaded classifier for the lifetime of the process and
//! serializes access to it. Burn modules are `Send` but make no promise about
//! concurrent forward passes, so every prediction takes the lock.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::decision::ProbabilityVector;
use super::preprocess::{InputTensor, INPUT_SHAPE};
use crate::utils::error::{PlantDocError, Result};

/// A loaded image classifier
///
/// Implementations return one score per class, in the model's output order.
pub trait Classifier: Send {
    /// Short identifier for logs
    fn name(&self) -> &str;

    /// Run one forward pass over a `[1, 224, 224, 3]` tensor
    fn predict(&self, input: &InputTensor) -> Result<Vec<f32>>;
}

/// Serialized access to one classifier instance
pub struct InferenceEngine {
    classifier: Mutex<Box<dyn Classifier>>,
    name: String,
    label_count: usize,
}

impl InferenceEngine {
    /// Wrap a classifier without probing it
    pub fn new(classifier: Box<dyn Classifier>, label_count: usize) -> Self {
        let name = classifier.name().to_string();
        Self {
            classifier: Mutex::new(classifier),
            name,
            label_count,
        }
    }

    /// Wrap a classifier and run a zero-tensor probe to confirm its output
    /// length matches the label catalog
    pub fn with_probe(classifier: Box<dyn Classifier>, label_count: usize) -> Result<Self> {
        let engine = Self::new(classifier, label_count);
        engine.probe()?;
        Ok(engine)
    }

    /// Startup sanity check: one inference on a zero tensor
    pub fn probe(&self) -> Result<()> {
        let start = Instant::now();
        let output = self.run(&InputTensor::zeros())?;
        if output.len() != self.label_count {
            return Err(PlantDocError::InvalidProbabilityVector {
                expected: self.label_count,
                actual: output.len(),
            });
        }
        info!(
            "Probe inference on '{}' returned {} classes in {:.1}ms",
            self.name,
            output.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(())
    }

    /// Predict class probabilities for one normalized image
    pub fn predict(&self, input: &InputTensor) -> Result<ProbabilityVector> {
        if input.shape() != INPUT_SHAPE {
            return Err(PlantDocError::Inference(format!(
                "expected input shape {:?}, got {:?}",
                INPUT_SHAPE,
                input.shape()
            )));
        }

        let start = Instant::now();
        let values = self.run(input)?;
        debug!(
            "Forward pass took {:.2}ms",
            start.elapsed().as_secs_f64() * 1000.0
        );

        if values.len() != self.label_count {
            return Err(PlantDocError::InvalidProbabilityVector {
                expected: self.label_count,
                actual: values.len(),
            });
        }

        Ok(ProbabilityVector::new(values))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label_count(&self) -> usize {
        self.label_count
    }

    fn run(&self, input: &InputTensor) -> Result<Vec<f32>> {
        let classifier = self.classifier.lock().unwrap_or_else(|poisoned| {
            warn!("Classifier lock was poisoned; continuing with the loaded model");
            poisoned.into_inner()
        });

        // Contain panics from the backend to this request
        panic::catch_unwind(AssertUnwindSafe(|| classifier.predict(input))).unwrap_or_else(|_| {
            Err(PlantDocError::Inference(format!(
                "classifier '{}' panicked during prediction",
                self.name
            )))
        })
    }
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("name", &self.name)
            .field("label_count", &self.label_count)
            .finish()
    }
}
