// ============================================================
// Layer 4 — Frame Pair Batcher
// ============================================================
// Implements Burn's Batcher trait to stack decoded frame pairs
// into tensors. The DataLoader calls `batch` on its worker
// threads, so every batch is internally consistent even though
// workers finish in no particular order.
//
//   Input:  Vec of N HandCamItems, each view [3 * S * S] floats
//   Output: HandCamBatch
//             hand_images / head_images : [N, 3, S, S]
//             fa / ges / obj labels     : [N]
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::HandCamItem;
use crate::data::frames::CHANNELS;

#[derive(Debug, Clone)]
pub struct HandCamBatch<B: Backend> {
    pub hand_images: Tensor<B, 4>,
    pub head_images: Tensor<B, 4>,
    pub fa_labels:   Tensor<B, 1, Int>,
    pub ges_labels:  Tensor<B, 1, Int>,
    pub obj_labels:  Tensor<B, 1, Int>,
}

impl<B: Backend> HandCamBatch<B> {
    pub fn len(&self) -> usize {
        self.obj_labels.dims()[0]
    }
}

#[derive(Clone, Debug)]
pub struct HandCamBatcher<B: Backend> {
    device:     B::Device,
    image_size: usize,
}

impl<B: Backend> HandCamBatcher<B> {
    pub fn new(device: B::Device, image_size: usize) -> Self {
        Self { device, image_size }
    }

    fn images(&self, pixels: Vec<f32>, batch_size: usize) -> Tensor<B, 4> {
        let shape = [batch_size, CHANNELS, self.image_size, self.image_size];
        Tensor::from_data(TensorData::new(pixels, shape), &self.device)
    }

    fn labels(&self, values: Vec<i32>) -> Tensor<B, 1, Int> {
        Tensor::<B, 1, Int>::from_ints(values.as_slice(), &self.device)
    }
}

impl<B: Backend> Batcher<HandCamItem, HandCamBatch<B>> for HandCamBatcher<B> {
    fn batch(&self, items: Vec<HandCamItem>) -> HandCamBatch<B> {
        let batch_size = items.len();

        let hand: Vec<f32> = items.iter().flat_map(|i| i.hand.iter().copied()).collect();
        let head: Vec<f32> = items.iter().flat_map(|i| i.head.iter().copied()).collect();

        let fa:  Vec<i32> = items.iter().map(|i| i.labels.fa as i32).collect();
        let ges: Vec<i32> = items.iter().map(|i| i.labels.ges as i32).collect();
        let obj: Vec<i32> = items.iter().map(|i| i.labels.obj as i32).collect();

        HandCamBatch {
            hand_images: self.images(hand, batch_size),
            head_images: self.images(head, batch_size),
            fa_labels:   self.labels(fa),
            ges_labels:  self.labels(ges),
            obj_labels:  self.labels(obj),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::labels::LabelTriplet;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_batch_shapes_and_labels() {
        let item = |v: f32, labels| HandCamItem {
            hand: vec![v; 3 * 2 * 2],
            head: vec![-v; 3 * 2 * 2],
            labels,
        };
        let batcher = HandCamBatcher::<TestBackend>::new(Default::default(), 2);
        let batch = batcher.batch(vec![
            item(0.25, LabelTriplet::new(1, 4, 20)),
            item(0.75, LabelTriplet::new(0, 12, 3)),
        ]);

        assert_eq!(batch.hand_images.dims(), [2, 3, 2, 2]);
        assert_eq!(batch.head_images.dims(), [2, 3, 2, 2]);
        assert_eq!(batch.len(), 2);

        let obj: Vec<i64> = batch.obj_labels.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(obj, vec![20, 3]);

        let hand: Vec<f32> = batch.hand_images.into_data().to_vec().unwrap();
        assert_eq!(hand[0], 0.25);
        assert_eq!(hand[12], 0.75);
    }
}
