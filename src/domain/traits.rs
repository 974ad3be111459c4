// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The dataset is built against these traits rather than the
// concrete on-disk loaders, so tests can hand it an in-memory
// label table and a fixed list of frames.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::path::Path;

use crate::domain::errors::DatasetError;
use crate::domain::frame::FrameRef;
use crate::domain::labels::{LabelTriplet, Task};
use crate::domain::session::{SessionKey, Split};

// ─── LabelLookup ──────────────────────────────────────────────────────────────
/// Anything that can resolve a frame of a session to its labels.
///
/// Implementations:
///   - LabelStore → per-session `.npy` arrays loaded at startup
pub trait LabelLookup {
    /// Label of one task at `offset` within the session.
    fn lookup_task(&self, task: Task, key: &SessionKey, offset: usize) -> Result<usize, DatasetError>;

    /// All three labels at `offset` within the session.
    fn lookup(&self, key: &SessionKey, offset: usize) -> Result<LabelTriplet, DatasetError> {
        Ok(LabelTriplet::new(
            self.lookup_task(Task::FunctionalArea, key, offset)?,
            self.lookup_task(Task::Gesture, key, offset)?,
            self.lookup_task(Task::Object, key, offset)?,
        ))
    }
}

// ─── FrameSource ──────────────────────────────────────────────────────────────
/// Anything that can list the frames of the active split.
///
/// Implementations:
///   - SampleIndex → walks `frames/<split>/...` on disk
pub trait FrameSource {
    /// Dataset root the frame paths are relative to
    fn root(&self) -> &Path;

    fn split(&self) -> Split;

    fn frames(&self) -> &[FrameRef];
}
