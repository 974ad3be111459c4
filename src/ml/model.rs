// ============================================================
// Layer 5 — Multi-Task Frame Pair Classifier
// ============================================================
// Both camera views go through ONE shared trunk:
//
//   hand ─┐                                  ┌─ fa_head  → [B, 2]
//         ├─ features ─ flatten ─ fc1 ─┐     │
//   head ─┘   (shared)               (shared)├─ ges_head → [B, 13]
//                                      cat ─ fc2 ─┤
//                                                 └─ obj_head → [B, 24]
//
// `features` is a VGG-style stack: each stage is N x
// (3x3 conv → batch norm → ReLU) closed by a 2x2 max pool,
// followed by adaptive average pooling to pooled_size².
// The defaults reproduce the VGG16-BN layout.
//
// Reference: Simonyan & Zisserman (2015) VGG
//            Burn Book §3 (Building Blocks)

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d,
        Relu,
    },
    prelude::*,
};

use crate::data::frames::CHANNELS;
use crate::domain::labels::Task;

#[derive(Config, Debug)]
pub struct HandCamModelConfig {
    /// Output channels of each feature stage
    #[config(default = "vec![64, 128, 256, 512, 512]")]
    pub stage_channels: Vec<usize>,
    /// Number of conv blocks in each feature stage
    #[config(default = "vec![2, 2, 3, 3, 3]")]
    pub convs_per_stage: Vec<usize>,
    /// Spatial size of the pooled feature map
    #[config(default = 7)]
    pub pooled_size: usize,
    /// Width of fc1 / fc2
    #[config(default = 4096)]
    pub hidden_size: usize,
    #[config(default = 0.5)]
    pub dropout: f64,
}

impl HandCamModelConfig {
    /// Stage lists must be non-empty and the same length.
    pub fn validate(&self) -> Result<(), String> {
        if self.stage_channels.is_empty() {
            return Err("feature extractor needs at least one stage".to_string());
        }
        if self.stage_channels.len() != self.convs_per_stage.len() {
            return Err(format!(
                "{} stage widths but {} conv counts",
                self.stage_channels.len(),
                self.convs_per_stage.len()
            ));
        }
        if self.convs_per_stage.contains(&0) || self.stage_channels.contains(&0) {
            return Err("feature stages need non-zero widths and conv counts".to_string());
        }
        Ok(())
    }

    /// Flattened length of one view's pooled feature map
    pub fn feature_len(&self) -> usize {
        let last = self.stage_channels.last().copied().unwrap_or(CHANNELS);
        last * self.pooled_size * self.pooled_size
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> HandCamModel<B> {
        let mut in_channels = CHANNELS;
        let mut stages = Vec::with_capacity(self.stage_channels.len());
        for (&out_channels, &convs) in self.stage_channels.iter().zip(&self.convs_per_stage) {
            let blocks = (0..convs)
                .map(|i| {
                    let input = if i == 0 { in_channels } else { out_channels };
                    ConvBlock {
                        conv: Conv2dConfig::new([input, out_channels], [3, 3])
                            .with_padding(PaddingConfig2d::Explicit(1, 1))
                            .init(device),
                        norm:       BatchNormConfig::new(out_channels).init(device),
                        activation: Relu::new(),
                    }
                })
                .collect();
            stages.push(FeatureStage {
                blocks,
                pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            });
            in_channels = out_channels;
        }

        let features = FeatureExtractor {
            stages,
            pool: AdaptiveAvgPool2dConfig::new([self.pooled_size, self.pooled_size]).init(),
        };

        let hidden = self.hidden_size;
        HandCamModel {
            features,
            fc1:        LinearConfig::new(self.feature_len(), hidden).init(device),
            fc2:        LinearConfig::new(2 * hidden, hidden).init(device),
            fa_head:    LinearConfig::new(hidden, Task::FunctionalArea.num_classes()).init(device),
            ges_head:   LinearConfig::new(hidden, Task::Gesture.num_classes()).init(device),
            obj_head:   LinearConfig::new(hidden, Task::Object.num_classes()).init(device),
            activation: Relu::new(),
            dropout:    DropoutConfig::new(self.dropout).init(),
        }
    }
}

// ─── Feature Extractor ────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv:       Conv2d<B>,
    pub norm:       BatchNorm<B, 2>,
    pub activation: Relu,
}

impl<B: Backend> ConvBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.activation.forward(self.norm.forward(self.conv.forward(x)))
    }
}

#[derive(Module, Debug)]
pub struct FeatureStage<B: Backend> {
    pub blocks: Vec<ConvBlock<B>>,
    pub pool:   MaxPool2d,
}

impl<B: Backend> FeatureStage<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.blocks.iter().fold(x, |x, block| block.forward(x));
        self.pool.forward(x)
    }
}

#[derive(Module, Debug)]
pub struct FeatureExtractor<B: Backend> {
    pub stages: Vec<FeatureStage<B>>,
    pub pool:   AdaptiveAvgPool2d,
}

impl<B: Backend> FeatureExtractor<B> {
    /// images: [batch, 3, H, W] → [batch, C, pooled, pooled]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.stages.iter().fold(images, |x, stage| stage.forward(x));
        self.pool.forward(x)
    }
}

// ─── Full Model ───────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct HandCamModel<B: Backend> {
    pub features:   FeatureExtractor<B>,
    pub fc1:        Linear<B>,
    pub fc2:        Linear<B>,
    pub fa_head:    Linear<B>,
    pub ges_head:   Linear<B>,
    pub obj_head:   Linear<B>,
    pub activation: Relu,
    pub dropout:    Dropout,
}

/// Logits of the three task heads.
#[derive(Debug, Clone)]
pub struct HandCamOutput<B: Backend> {
    pub fa_logits:  Tensor<B, 2>,
    pub ges_logits: Tensor<B, 2>,
    pub obj_logits: Tensor<B, 2>,
}

impl<B: Backend> HandCamModel<B> {
    /// One view through the shared extractor and shared fc1.
    fn embed(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.features.forward(images).flatten::<2>(1, 3);
        self.dropout.forward(self.activation.forward(self.fc1.forward(x)))
    }

    /// hand_images, head_images: [batch, 3, H, W]
    pub fn forward(&self, hand_images: Tensor<B, 4>, head_images: Tensor<B, 4>) -> HandCamOutput<B> {
        let hand = self.embed(hand_images);
        let head = self.embed(head_images);

        let x = Tensor::cat(vec![hand, head], 1);
        let x = self.dropout.forward(self.activation.forward(self.fc2.forward(x)));

        HandCamOutput {
            fa_logits:  self.fa_head.forward(x.clone()),
            ges_logits: self.ges_head.forward(x.clone()),
            obj_logits: self.obj_head.forward(x),
        }
    }
}

/// Two small stages, used by tests across the crate.
#[cfg(test)]
pub(crate) fn tiny_config() -> HandCamModelConfig {
    HandCamModelConfig::new()
        .with_stage_channels(vec![4, 8])
        .with_convs_per_stage(vec![1, 1])
        .with_pooled_size(2)
        .with_hidden_size(8)
        .with_dropout(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_default_config_is_vgg16_bn() {
        let cfg = HandCamModelConfig::new();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.convs_per_stage.iter().sum::<usize>(), 13);
        assert_eq!(cfg.feature_len(), 512 * 7 * 7);
    }

    #[test]
    fn test_validate_rejects_mismatched_stages() {
        let cfg = HandCamModelConfig::new().with_convs_per_stage(vec![2, 2]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_forward_produces_three_heads() {
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);

        let hand = Tensor::<TestBackend, 4>::ones([3, 3, 16, 16], &device);
        let head = Tensor::<TestBackend, 4>::zeros([3, 3, 16, 16], &device);
        let out  = model.forward(hand, head);

        assert_eq!(out.fa_logits.dims(), [3, 2]);
        assert_eq!(out.ges_logits.dims(), [3, 13]);
        assert_eq!(out.obj_logits.dims(), [3, 24]);
    }

    #[test]
    fn test_views_share_one_trunk() {
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);

        // A second copy of the extractor or fc1 would show up here
        let expected = model.features.num_params()
            + model.fc1.num_params()
            + model.fc2.num_params()
            + model.fa_head.num_params()
            + model.ges_head.num_params()
            + model.obj_head.num_params();
        assert_eq!(model.num_params(), expected);

        // fc2 sees both views: 2 x hidden inputs
        assert_eq!(model.fc2.weight.dims(), [16, 8]);
        assert_eq!(model.fc1.weight.dims(), [8 * 2 * 2, 8]);
    }
}
