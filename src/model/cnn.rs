//! Leaf classifier network
//!
//! A stack of conv blocks that halve the spatial size and double the channel
//! count, global average pooling, then a two-layer head. The layer layout is
//! the contract between `model.mpk` and this code; change it only together
//! with the bundles that depend on it.

use burn::{
    config::Config,
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d,
        Relu,
    },
    tensor::{activation::softmax, backend::Backend, Tensor},
};

/// Architecture of a `PlantClassifier`, stored as `model.json` in a bundle
#[derive(Config, Debug)]
pub struct PlantClassifierConfig {
    /// Output classes; must equal the bundle's label count
    #[config(default = "8")]
    pub num_classes: usize,

    /// Square input edge the weights were trained at
    #[config(default = "224")]
    pub input_size: usize,

    #[config(default = "3")]
    pub in_channels: usize,

    /// Channels after the first block; doubled by each following block
    #[config(default = "32")]
    pub base_filters: usize,

    #[config(default = "4")]
    pub num_blocks: usize,

    /// Width of the hidden layer in the head
    #[config(default = "256")]
    pub hidden_units: usize,

    /// Only active under an autodiff backend, so inert here
    #[config(default = "0.3")]
    pub dropout_rate: f64,
}

impl PlantClassifierConfig {
    /// Channels leaving the last conv block
    pub fn feature_channels(&self) -> usize {
        self.base_filters << self.num_blocks.saturating_sub(1)
    }
}

/// 3x3 conv (same padding), batch norm, ReLU, 2x2 max pool
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    conv: Conv2d<B>,
    norm: BatchNorm<B, 2>,
    activation: Relu,
    pool: MaxPool2d,
}

impl<B: Backend> ConvBlock<B> {
    pub fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        Self {
            conv: Conv2dConfig::new([in_channels, out_channels], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            norm: BatchNormConfig::new(out_channels).init(device),
            activation: Relu::new(),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.norm.forward(self.conv.forward(x));
        self.pool.forward(self.activation.forward(x))
    }
}

/// Pooled features to class logits
#[derive(Module, Debug)]
pub struct ClassifierHead<B: Backend> {
    hidden: Linear<B>,
    activation: Relu,
    dropout: Dropout,
    output: Linear<B>,
}

impl<B: Backend> ClassifierHead<B> {
    pub fn new(config: &PlantClassifierConfig, device: &B::Device) -> Self {
        Self {
            hidden: LinearConfig::new(config.feature_channels(), config.hidden_units).init(device),
            activation: Relu::new(),
            dropout: DropoutConfig::new(config.dropout_rate).init(),
            output: LinearConfig::new(config.hidden_units, config.num_classes).init(device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.activation.forward(self.hidden.forward(x));
        self.output.forward(self.dropout.forward(x))
    }
}

/// Plant disease CNN
#[derive(Module, Debug)]
pub struct PlantClassifier<B: Backend> {
    features: Vec<ConvBlock<B>>,
    pool: AdaptiveAvgPool2d,
    head: ClassifierHead<B>,
    num_classes: usize,
}

impl<B: Backend> PlantClassifier<B> {
    /// Randomly initialized model; load weights with `Module::load_file`
    pub fn new(config: &PlantClassifierConfig, device: &B::Device) -> Self {
        let mut features = Vec::with_capacity(config.num_blocks);
        let mut channels = config.in_channels;
        for i in 0..config.num_blocks {
            let out = config.base_filters << i;
            features.push(ConvBlock::new(channels, out, device));
            channels = out;
        }

        Self {
            features,
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            head: ClassifierHead::new(config, device),
            num_classes: config.num_classes,
        }
    }

    /// `[batch, channels, height, width]` to logits `[batch, num_classes]`
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self
            .features
            .iter()
            .fold(x, |x, block| block.forward(x));

        let [batch, channels, _, _] = x.dims();
        let x = self.pool.forward(x).reshape([batch, channels]);
        self.head.forward(x)
    }

    /// Class probabilities, one row per image
    pub fn forward_softmax(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        softmax(self.forward(x), 1)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn num_blocks(&self) -> usize {
        self.features.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{default_device, rng_guard, DefaultBackend};

    type TestBackend = DefaultBackend;

    fn small_config(num_classes: usize) -> PlantClassifierConfig {
        PlantClassifierConfig::new()
            .with_num_classes(num_classes)
            .with_base_filters(4)
            .with_hidden_units(16)
    }

    #[test]
    fn test_default_config_matches_bundle_geometry() {
        let config = PlantClassifierConfig::new();
        assert_eq!(config.num_classes, 8);
        assert_eq!(config.input_size, 224);
        assert_eq!(config.in_channels, 3);
        assert_eq!(config.feature_channels(), 256);
    }

    #[test]
    fn test_logits_shape() {
        let _rng = rng_guard();
        let device = default_device();
        let model = PlantClassifier::<TestBackend>::new(&small_config(5), &device);

        let logits = model.forward(Tensor::<TestBackend, 4>::zeros([2, 3, 64, 64], &device));

        assert_eq!(logits.dims(), [2, 5]);
        assert_eq!(model.num_classes(), 5);
        assert_eq!(model.num_blocks(), 4);
    }

    #[test]
    fn test_fewer_blocks() {
        let _rng = rng_guard();
        let device = default_device();
        let config = small_config(3).with_num_blocks(2);
        assert_eq!(config.feature_channels(), 8);

        let model = PlantClassifier::<TestBackend>::new(&config, &device);
        let logits = model.forward(Tensor::<TestBackend, 4>::ones([1, 3, 16, 16], &device));
        assert_eq!(logits.dims(), [1, 3]);
    }

    #[test]
    fn test_softmax_rows_are_distributions() {
        let _rng = rng_guard();
        let device = default_device();
        let model = PlantClassifier::<TestBackend>::new(&small_config(3), &device);

        let input = Tensor::<TestBackend, 4>::ones([1, 3, 32, 32], &device);
        let probs: Vec<f32> = model.forward_softmax(input).into_data().to_vec().unwrap();

        assert_eq!(probs.len(), 3);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-4);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }
}
