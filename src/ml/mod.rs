// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
//
//   model.rs     — shared VGG-style trunk over both camera
//                  views, fc1/fc2, three task heads
//
//   loss.rs      — per-task cross-entropies, object classes
//                  weighted by inverse frequency
//
//   schedule.rs  — staircase learning-rate decay
//
//   trainer.rs   — step-budgeted SGD loop with periodic
//                  snapshots and resume
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Multi-task frame pair classifier
pub mod model;

/// Multi-task loss composition
pub mod loss;

/// Learning-rate schedule
pub mod schedule;

/// Training loop, cadence and loop phases
pub mod trainer;
