// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one goal:
//
//   train_use_case.rs — full training run from a data root
//
// No model math and no printing here; the CLI prints what the
// use case returns.

// The training workflow
pub mod train_use_case;
