// ============================================================
// Layer 4 — Label Store
// ============================================================
// Loads every per-session label array of a split once at
// startup and answers (session key, frame offset) lookups.
//
// On-disk layout, one file per task per session:
//
//   <root>/labels/<env>/FA_<side><session>.npy
//   <root>/labels/<env>/ges_<side><session>.npy
//   <root>/labels/<env>/obj_<side><session>.npy
//
// For the train split that is 3 environments x 2 sides x
// sessions 1..=3 x 3 tasks = 54 arrays; evaluation splits read
// sessions 4..=6 instead.
//
// The store is an owned value built by the application and
// passed to the dataset builder. Lookups never retry: a miss is
// a dataset/code mismatch.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::data::npy;
use crate::domain::{
    errors::DatasetError,
    labels::Task,
    session::{SessionKey, Split},
    traits::LabelLookup,
};

/// The three task arrays of one session.
#[derive(Debug, Clone, Default)]
pub struct SessionLabels {
    fa:  Vec<i64>,
    ges: Vec<i64>,
    obj: Vec<i64>,
}

impl SessionLabels {
    pub fn new(fa: Vec<i64>, ges: Vec<i64>, obj: Vec<i64>) -> Self {
        Self { fa, ges, obj }
    }

    pub fn task(&self, task: Task) -> &[i64] {
        match task {
            Task::FunctionalArea => &self.fa,
            Task::Gesture        => &self.ges,
            Task::Object         => &self.obj,
        }
    }

    fn task_mut(&mut self, task: Task) -> &mut Vec<i64> {
        match task {
            Task::FunctionalArea => &mut self.fa,
            Task::Gesture        => &mut self.ges,
            Task::Object         => &mut self.obj,
        }
    }
}

#[derive(Debug, Default)]
pub struct LabelStore {
    sessions: HashMap<SessionKey, SessionLabels>,
}

impl LabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of one task's label array for a session
    pub fn label_path(root: &Path, task: Task, key: &SessionKey) -> PathBuf {
        root.join("labels")
            .join(key.environment.as_str())
            .join(format!("{}_{}{}.npy", task.file_prefix(), key.side.as_str(), key.session))
    }

    /// Load every label array visible to `split`.
    ///
    /// Any missing or malformed file fails the whole load.
    pub fn load(root: &Path, split: Split) -> Result<Self, DatasetError> {
        let mut store = Self::new();

        for key in SessionKey::all_for(split) {
            let mut labels = SessionLabels::default();
            for task in Task::ALL {
                let path = Self::label_path(root, task, &key);
                *labels.task_mut(task) = npy::read_labels(&path)?;
                tracing::debug!(
                    "Loaded {} labels for {} from '{}'",
                    labels.task(task).len(),
                    key,
                    path.display()
                );
            }
            store.insert(key, labels);
        }

        tracing::info!(
            "Loaded labels for {} sessions of split '{}'",
            store.session_count(),
            split
        );
        Ok(store)
    }

    pub fn insert(&mut self, key: SessionKey, labels: SessionLabels) {
        self.sessions.insert(key, labels);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl LabelLookup for LabelStore {
    fn lookup_task(&self, task: Task, key: &SessionKey, offset: usize) -> Result<usize, DatasetError> {
        let labels = self
            .sessions
            .get(key)
            .ok_or(DatasetError::MissingSession { key: *key })?
            .task(task);

        let value = *labels.get(offset).ok_or(DatasetError::OutOfRange {
            key:    *key,
            task,
            offset,
            len:    labels.len(),
        })?;

        // Labels are class indices for the task's head
        usize::try_from(value)
            .ok()
            .filter(|&class| class < task.num_classes())
            .ok_or(DatasetError::InvalidLabel { key: *key, task, offset, value })
    }
}
