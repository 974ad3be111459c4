// ============================================================
// Layer 3 — Task Heads and Label Triplets
// ============================================================
// Every frame carries three independent labels, one per task
// head of the model:
//
//   FA      — hand touching a functional area (2 classes)
//   Gesture — hand gesture category          (13 classes)
//   Object  — object being interacted with   (24 classes)
//
// Each task has its own per-session label array on disk,
// named `<prefix>_<side><session>.npy`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Task {
    FunctionalArea,
    Gesture,
    Object,
}

impl Task {
    pub const ALL: [Task; 3] = [Task::FunctionalArea, Task::Gesture, Task::Object];

    pub fn num_classes(self) -> usize {
        match self {
            Task::FunctionalArea => 2,
            Task::Gesture        => 13,
            Task::Object         => 24,
        }
    }

    /// File-name prefix of this task's label arrays
    pub fn file_prefix(self) -> &'static str {
        match self {
            Task::FunctionalArea => "FA",
            Task::Gesture        => "ges",
            Task::Object         => "obj",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Task::FunctionalArea => "fa",
            Task::Gesture        => "ges",
            Task::Object         => "obj",
        }
    }
}

/// The three labels of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelTriplet {
    pub fa:  usize,
    pub ges: usize,
    pub obj: usize,
}

impl LabelTriplet {
    pub fn new(fa: usize, ges: usize, obj: usize) -> Self {
        Self { fa, ges, obj }
    }
}
