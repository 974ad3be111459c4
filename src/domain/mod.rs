// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that name the concepts of the dataset:
// which recording a frame came from, which split is active,
// and which labels a frame carries.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums, traits and error types
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

/// Environment / side / split / session key
pub mod session;

/// Task heads and per-frame label triplets
pub mod labels;

/// Parsed frame identity and path reconstruction
pub mod frame;

/// Typed dataset configuration errors
pub mod errors;

/// Abstractions the data layer implements
pub mod traits;
