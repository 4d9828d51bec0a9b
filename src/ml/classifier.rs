// ============================================================
// Layer 5: Food Spoilage Classifier
// ============================================================
// A compact VGG-style CNN:
//
//   [B, 3, S, S]
//     └─ stage × N: conv 3x3 (same) → ReLU → max-pool 2x2
//     └─ adaptive average pool → [B, C]
//     └─ dense → ReLU → dense(1) → sigmoid
//   [B, 1]  probability of "spoiled_items"
//
// The global pool makes the network independent of the input
// resolution, but it is served at the size it was trained at.

use anyhow::{Context, Result};
use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::{relu, sigmoid},
};
use std::sync::Mutex;

use crate::domain::{inference::PreparedImage, traits::ImageClassifier};
use crate::ml::{InferBackend, InferDevice};

#[derive(Config, Debug)]
pub struct FoodClassifierConfig {
    #[config(default = 3)]
    pub channels: usize,
    /// Output channels of each conv stage.
    #[config(default = "vec![16, 32, 64]")]
    pub stage_channels: Vec<usize>,
    #[config(default = 64)]
    pub hidden: usize,
}

impl FoodClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> FoodClassifier<B> {
        let mut stages = Vec::with_capacity(self.stage_channels.len());
        let mut in_ch = self.channels;
        for &out_ch in &self.stage_channels {
            let conv = Conv2dConfig::new([in_ch, out_ch], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device);
            let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();
            stages.push(ConvStage { conv, pool });
            in_ch = out_ch;
        }
        FoodClassifier {
            stages,
            global_pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            hidden: LinearConfig::new(in_ch, self.hidden).init(device),
            head: LinearConfig::new(self.hidden, 1).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct ConvStage<B: Backend> {
    pub conv: Conv2d<B>,
    pub pool: MaxPool2d,
}

#[derive(Module, Debug)]
pub struct FoodClassifier<B: Backend> {
    pub stages:      Vec<ConvStage<B>>,
    pub global_pool: AdaptiveAvgPool2d,
    pub hidden:      Linear<B>,
    pub head:        Linear<B>,
}

impl<B: Backend> FoodClassifier<B> {
    /// images: [batch, channels, height, width] → [batch, 1]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = images;
        for stage in &self.stages {
            x = stage.pool.forward(relu(stage.conv.forward(x)));
        }
        let x = self.global_pool.forward(x).flatten::<2>(1, 3);
        let x = relu(self.hidden.forward(x));
        sigmoid(self.head.forward(x))
    }
}

// ─── Serving wrapper ──────────────────────────────────────────────────────────
/// A loaded classifier shared by all requests.
///
/// Burn modules are only required to be `Send`; the mutex makes
/// the wrapper `Sync` and is held for one forward pass.
pub struct BurnFoodClassifier {
    model:  Mutex<FoodClassifier<InferBackend>>,
    device: InferDevice,
}

impl BurnFoodClassifier {
    pub fn new(model: FoodClassifier<InferBackend>, device: InferDevice) -> Self {
        Self { model: Mutex::new(model), device }
    }
}

impl ImageClassifier for BurnFoodClassifier {
    fn spoilage_probability(&self, image: &PreparedImage) -> Result<f32> {
        let [c, h, w] = image.shape();
        let input = Tensor::<InferBackend, 1>::from_floats(image.pixels.as_slice(), &self.device)
            .reshape([1, c, h, w]);

        let output = {
            let model = self
                .model
                .lock()
                .map_err(|_| anyhow::anyhow!("classifier lock poisoned"))?;
            model.forward(input)
        };

        let probs = output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read classifier output: {e:?}"))?;
        probs.first().copied().context("Classifier returned no output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> FoodClassifierConfig {
        FoodClassifierConfig::new().with_stage_channels(vec![4, 8]).with_hidden(8)
    }

    fn gray_image(size: usize) -> PreparedImage {
        PreparedImage {
            pixels:   vec![0.5; 3 * size * size],
            channels: 3,
            height:   size,
            width:    size,
        }
    }

    #[test]
    fn test_forward_shape_and_range() {
        let device = InferDevice::default();
        let model: FoodClassifier<InferBackend> = small_config().init(&device);
        let out = model.forward(Tensor::zeros([2, 3, 32, 32], &device));
        assert_eq!(out.dims(), [2, 1]);
        let values = out.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_same_image_same_probability() {
        let device = InferDevice::default();
        let classifier = BurnFoodClassifier::new(small_config().init(&device), device);
        let image = gray_image(32);
        let a = classifier.spoilage_probability(&image).unwrap();
        let b = classifier.spoilage_probability(&image).unwrap();
        assert_eq!(a, b);
    }
}
