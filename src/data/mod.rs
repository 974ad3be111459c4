// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From a dataset root on disk to tensor batches:
//
//   labels/<env>/*.npy                frames/<split>/...png
//       │                                     │
//       ▼                                     ▼
//   npy + LabelStore                     SampleIndex
//   (per-session label arrays)           (hand frames → key + offset)
//       │                                     │
//       └──────────────┬──────────────────────┘
//                      ▼
//               HandCamDataset   → pairs + labels, decodes on `get`
//                      │
//                      ▼
//               HandCamBatcher   → stacks pairs into tensors
//                      │
//                      ▼
//               DataLoader       → worker threads, shuffling
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Minimal reader for 1-D integer .npy label arrays
pub mod npy;

/// Per-session label arrays for the three tasks
pub mod labels;

/// Hand-view frame enumeration and path parsing
pub mod index;

/// PNG decoding and resizing to CHW floats
pub mod frames;

/// Implements Burn's Dataset trait for frame pairs
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
