use std::path::PathBuf;

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::frames::FrameDecoder;
use crate::domain::{
    errors::DatasetError,
    frame::FrameRef,
    labels::LabelTriplet,
    traits::{FrameSource, LabelLookup},
};

/// One training example before decoding: a hand/head frame pair
/// and the frame's three labels, resolved at build time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramePair {
    pub frame:     FrameRef,
    pub hand_path: PathBuf,
    pub head_path: PathBuf,
    pub labels:    LabelTriplet,
}

/// A decoded example, `[3, size, size]` pixels per view.
#[derive(Debug, Clone)]
pub struct HandCamItem {
    pub hand:   Vec<f32>,
    pub head:   Vec<f32>,
    pub labels: LabelTriplet,
}

pub struct HandCamDataset {
    pairs:   Vec<FramePair>,
    decoder: FrameDecoder,
}

impl HandCamDataset {
    /// Pair every indexed frame with its head view and labels.
    ///
    /// A label miss is fatal (the dataset and its label arrays
    /// disagree). A hand frame with no head-view counterpart is
    /// left out with a warning.
    pub fn build<F, L>(frames: &F, labels: &L, decoder: FrameDecoder) -> Result<Self, DatasetError>
    where
        F: FrameSource,
        L: LabelLookup,
    {
        let (root, split) = (frames.root(), frames.split());
        let mut pairs = Vec::with_capacity(frames.frames().len());

        for frame in frames.frames() {
            let triplet   = labels.lookup(&frame.key, frame.offset)?;
            let hand_path = frame.hand_path(root, split);
            let head_path = frame.head_path(root, split);

            if !head_path.is_file() {
                tracing::warn!(
                    "Excluding frame '{}': no head view at '{}'",
                    hand_path.display(),
                    head_path.display()
                );
                continue;
            }

            pairs.push(FramePair { frame: frame.clone(), hand_path, head_path, labels: triplet });
        }

        tracing::info!("Dataset ready: {} frame pairs", pairs.len());
        Ok(Self { pairs, decoder })
    }

    pub fn pairs(&self) -> &[FramePair] {
        &self.pairs
    }
}

impl Dataset<HandCamItem> for HandCamDataset {
    fn get(&self, index: usize) -> Option<HandCamItem> {
        let pair = self.pairs.get(index)?;
        let decoded = self
            .decoder
            .decode(&pair.hand_path)
            .and_then(|hand| Ok((hand, self.decoder.decode(&pair.head_path)?)));

        match decoded {
            Ok((hand, head)) => Some(HandCamItem { hand, head, labels: pair.labels }),
            Err(e) => {
                // The loader treats a missing item as the end of the pass
                tracing::error!(
                    "Cannot load frame pair {} ({} frame {}): {}",
                    index,
                    pair.frame.key,
                    pair.frame.offset,
                    e
                );
                None
            }
        }
    }

    fn len(&self) -> usize {
        self.pairs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::index::SampleIndex;
    use crate::data::labels::{LabelStore, SessionLabels};
    use crate::domain::frame::FrameName;
    use crate::domain::session::{Environment, SessionKey, Side, Split};
    use image::RgbImage;
    use std::path::Path;

    fn write_frame(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbImage::new(4, 4).save(path).unwrap();
    }

    fn fixture(root: &Path) -> (SampleIndex, LabelStore) {
        let key    = SessionKey::new(Environment::House, Side::Left, 1);
        let frames = vec![
            FrameRef::new(key, 0, FrameName::canonical(0)),
            FrameRef::new(key, 1, FrameName::canonical(1)),
        ];
        for f in &frames {
            write_frame(&f.hand_path(root, Split::Train));
        }
        // Only frame 0 has a head view
        write_frame(&frames[0].head_path(root, Split::Train));

        let mut store = LabelStore::new();
        store.insert(key, SessionLabels::new(vec![1, 0], vec![12, 3], vec![23, 4]));
        (SampleIndex::from_frames(root, Split::Train, frames), store)
    }

    #[test]
    fn test_build_resolves_labels_and_skips_unpaired_frames() {
        let dir = tempfile::tempdir().unwrap();
        let (index, store) = fixture(dir.path());

        let dataset = HandCamDataset::build(&index, &store, FrameDecoder::new(4)).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.pairs()[0].labels, LabelTriplet::new(1, 12, 23));

        let item = dataset.get(0).unwrap();
        assert_eq!(item.hand.len(), 48);
        assert_eq!(item.head.len(), 48);
        assert!(dataset.get(1).is_none());
    }

    #[test]
    fn test_build_fails_when_labels_are_short() {
        let dir = tempfile::tempdir().unwrap();
        let (index, _) = fixture(dir.path());
        let mut store = LabelStore::new();
        store.insert(
            SessionKey::new(Environment::House, Side::Left, 1),
            SessionLabels::new(vec![1], vec![1], vec![1]),
        );

        assert!(matches!(
            HandCamDataset::build(&index, &store, FrameDecoder::new(4)),
            Err(DatasetError::OutOfRange { offset: 1, .. })
        ));
    }

    #[test]
    fn test_undecodable_frame_yields_no_item() {
        let dir = tempfile::tempdir().unwrap();
        let (index, store) = fixture(dir.path());
        let dataset = HandCamDataset::build(&index, &store, FrameDecoder::new(4)).unwrap();

        std::fs::write(&dataset.pairs()[0].hand_path, b"not a png").unwrap();
        assert!(dataset.get(0).is_none());
    }
}
