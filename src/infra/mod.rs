// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything the training run writes to the logs directory:
//
//   checkpoint.rs — model-<step>.mpk.gz files: step, model and
//                   optimizer records in one Burn record,
//                   at most `maximum` kept (oldest step first
//                   out)
//
//   history.rs    — losses.json and the RunState restored
//                   alongside a checkpoint
//
//   metrics.rs    — metrics.csv, one row per show-loss step
//
// Reference: Burn Book §5 (Checkpointing)

/// Bounded checkpoint files
pub mod checkpoint;

/// Loss history and run state
pub mod history;

/// Training metrics CSV logger
pub mod metrics;
