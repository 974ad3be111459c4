// ============================================================
// Layer 5 — Multi-Task Loss
// ============================================================
// Three independent cross-entropies, one per head. The caller
// adds them with equal coefficient 1.
//
// The object head is heavily imbalanced (the most frequent
// class has ~500x the frames of the rarest), so its loss uses
// per-class weights
//
//   w[c] = 1 - count[c] / total
//
// computed once from the fixed frequency table below. FA and
// gesture losses are unweighted.

use burn::{
    nn::loss::{CrossEntropyLoss, CrossEntropyLossConfig},
    prelude::*,
};

use crate::domain::labels::Task;
use crate::ml::model::HandCamOutput;

/// Frames per object class in the training labels
pub const OBJECT_CLASS_COUNTS: [u32; 24] = [
    7228, 746, 342, 197, 190, 832, 811, 230, 529, 1166, 129, 87,
    14, 32, 65, 51, 64, 125, 613, 458, 546, 438, 33, 66,
];

/// `1 - count / total` for every class.
pub fn class_weights(counts: &[u32]) -> Vec<f32> {
    let total: u64 = counts.iter().map(|&c| u64::from(c)).sum();
    if total == 0 {
        return vec![1.0; counts.len()];
    }
    counts
        .iter()
        .map(|&c| (1.0 - f64::from(c) / total as f64) as f32)
        .collect()
}

/// Per-task losses of one batch, each a single-element tensor.
#[derive(Debug, Clone)]
pub struct TaskLosses<B: Backend> {
    pub fa:  Tensor<B, 1>,
    pub ges: Tensor<B, 1>,
    pub obj: Tensor<B, 1>,
}

/// Host-side copy of a batch's losses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossValues {
    pub total: f64,
    pub fa:    f64,
    pub ges:   f64,
    pub obj:   f64,
}

impl LossValues {
    /// First task whose loss is NaN or infinite, if any
    pub fn non_finite_task(&self) -> Option<Task> {
        [(Task::FunctionalArea, self.fa), (Task::Gesture, self.ges), (Task::Object, self.obj)]
            .into_iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(task, _)| task)
    }
}

impl<B: Backend> TaskLosses<B> {
    /// Unweighted sum of the three task losses
    pub fn total(&self) -> Tensor<B, 1> {
        self.fa.clone() + self.ges.clone() + self.obj.clone()
    }

    pub fn values(&self) -> LossValues {
        let scalar = |t: &Tensor<B, 1>| t.clone().into_scalar().elem::<f64>();
        let (fa, ges, obj) = (scalar(&self.fa), scalar(&self.ges), scalar(&self.obj));
        LossValues { total: fa + ges + obj, fa, ges, obj }
    }
}

pub struct LossCompose<B: Backend> {
    fa:  CrossEntropyLoss<B>,
    ges: CrossEntropyLoss<B>,
    obj: CrossEntropyLoss<B>,
}

impl<B: Backend> LossCompose<B> {
    /// `object_weights` must have one entry per object class.
    pub fn new(object_weights: Vec<f32>, device: &B::Device) -> Self {
        Self {
            fa:  CrossEntropyLossConfig::new().init(device),
            ges: CrossEntropyLossConfig::new().init(device),
            obj: CrossEntropyLossConfig::new()
                .with_weights(Some(object_weights))
                .init(device),
        }
    }

    /// Weights from the fixed object frequency table
    pub fn with_default_weights(device: &B::Device) -> Self {
        Self::new(class_weights(&OBJECT_CLASS_COUNTS), device)
    }

    pub fn loss(
        &self,
        output:     &HandCamOutput<B>,
        fa_labels:  Tensor<B, 1, Int>,
        ges_labels: Tensor<B, 1, Int>,
        obj_labels: Tensor<B, 1, Int>,
    ) -> TaskLosses<B> {
        TaskLosses {
            fa:  self.fa.forward(output.fa_logits.clone(), fa_labels),
            ges: self.ges.forward(output.ges_logits.clone(), ges_labels),
            obj: self.obj.forward(output.obj_logits.clone(), obj_labels),
        }
    }
}
