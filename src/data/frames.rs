// ============================================================
// Layer 4 — Frame Decoder
// ============================================================
// Turns one image file into the flat tensor data the model
// consumes:
//
//   decode PNG/JPEG → RGB8 → resize to size x size (if needed)
//   → scale to [0, 1] → channel-major layout [3, size, size]
//
// No mean/std normalisation is applied; the model sees the
// same [0, 1] range the reference pipeline produced.
//
// Runs inside the data loader's worker threads.
//
// Reference: image crate documentation

use std::path::Path;

use image::imageops::FilterType;

use crate::domain::errors::DatasetError;

pub const CHANNELS: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct FrameDecoder {
    size: u32,
}

impl FrameDecoder {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Number of f32 values `decode` returns
    pub fn values_per_frame(&self) -> usize {
        CHANNELS * self.size() * self.size()
    }

    pub fn decode(&self, path: &Path) -> Result<Vec<f32>, DatasetError> {
        let img = image::open(path).map_err(|e| DatasetError::Frame {
            path:   path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let img = if img.width() != self.size || img.height() != self.size {
            img.resize_exact(self.size, self.size, FilterType::Triangle)
        } else {
            img
        };
        let rgb = img.to_rgb8();

        // HWC u8 → CHW f32
        let side  = self.size();
        let plane = side * side;
        let mut out = vec![0.0f32; self.values_per_frame()];
        for (x, y, pixel) in rgb.enumerate_pixels() {
            let at = y as usize * side + x as usize;
            for c in 0..CHANNELS {
                out[c * plane + at] = f32::from(pixel[c]) / 255.0;
            }
        }
        Ok(out)
    }
}
