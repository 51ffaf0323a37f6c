//! Burn-backed implementation of the `Classifier` trait
//!
//! Accepts the NHWC tensor produced by the preprocessor and swaps it into the
//! NCHW layout the convolution layers expect.

use burn::tensor::{backend::Backend, Tensor, TensorData};

use super::cnn::PlantClassifier;
use crate::inference::{Classifier, InputTensor};
use crate::utils::error::{PlantDocError, Result};

/// A loaded `PlantClassifier` bound to one device
pub struct BurnClassifier<B: Backend> {
    model: PlantClassifier<B>,
    device: B::Device,
    name: String,
}

impl<B: Backend> BurnClassifier<B> {
    pub fn new(model: PlantClassifier<B>, device: B::Device, name: impl Into<String>) -> Self {
        Self {
            model,
            device,
            name: name.into(),
        }
    }

    pub fn num_classes(&self) -> usize {
        self.model.num_classes()
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }
}

impl<B: Backend> std::fmt::Debug for BurnClassifier<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BurnClassifier")
            .field("name", &self.name)
            .field("num_classes", &self.model.num_classes())
            .finish()
    }
}

impl<B: Backend> Classifier for BurnClassifier<B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, input: &InputTensor) -> Result<Vec<f32>> {
        let shape = input.shape();
        let data = TensorData::new(input.as_slice().to_vec(), shape);

        // [N, H, W, C] -> [N, C, W, H] -> [N, C, H, W]
        let x = Tensor::<B, 4>::from_data(data, &self.device)
            .swap_dims(1, 3)
            .swap_dims(2, 3);

        let probs = self.model.forward_softmax(x);
        let [batch, classes] = probs.dims();
        if batch != 1 {
            return Err(PlantDocError::Inference(format!(
                "expected a single output row, got {}",
                batch
            )));
        }

        let values: Vec<f32> = probs
            .into_data()
            .to_vec()
            .map_err(|e| PlantDocError::Inference(format!("failed to read output: {:?}", e)))?;

        if values.len() != classes {
            return Err(PlantDocError::Inference(format!(
                "output buffer has {} values for {} classes",
                values.len(),
                classes
            )));
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{default_device, rng_guard, DefaultBackend};
    use crate::model::cnn::PlantClassifierConfig;

    fn tiny_classifier(num_classes: usize) -> BurnClassifier<DefaultBackend> {
        let device = default_device();
        let config = PlantClassifierConfig::new()
            .with_num_classes(num_classes)
            .with_base_filters(4);
        let model = PlantClassifier::new(&config, &device);
        BurnClassifier::new(model, device, "tiny")
    }

    #[test]
    fn test_predict_returns_distribution() {
        let _rng = rng_guard();
        let classifier = tiny_classifier(8);
        let probs = classifier.predict(&InputTensor::zeros()).unwrap();

        assert_eq!(probs.len(), 8);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert_eq!(classifier.name(), "tiny");
        assert_eq!(classifier.num_classes(), 8);
    }

    #[test]
    fn test_same_input_gives_same_output() {
        let _rng = rng_guard();
        let classifier = tiny_classifier(4);
        let input = InputTensor::from_vec(
            (0..224 * 224 * 3).map(|i| (i % 255) as f32 / 255.0).collect(),
            [1, 224, 224, 3],
        )
        .unwrap();

        let first = classifier.predict(&input).unwrap();
        let second = classifier.predict(&input).unwrap();
        assert_eq!(first, second);
    }
}
