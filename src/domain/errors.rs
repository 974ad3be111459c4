// ============================================================
// Layer 3 — Dataset Errors
// ============================================================
// Every variant here means the dataset on disk and the code
// disagree. None of them are transient, so nothing retries:
// they abort startup (MalformedPath only drops one entry
// while enumerating).

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::labels::Task;
use crate::domain::session::SessionKey;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("no labels loaded for session {key}")]
    MissingSession { key: SessionKey },

    #[error("frame offset {offset} out of range for {task:?} labels of session {key} (len {len})")]
    OutOfRange {
        key:    SessionKey,
        task:   Task,
        offset: usize,
        len:    usize,
    },

    #[error("label {value} at offset {offset} of session {key} is not a valid {task:?} class")]
    InvalidLabel {
        key:    SessionKey,
        task:   Task,
        offset: usize,
        value:  i64,
    },

    #[error("malformed frame path '{}': {reason}", path.display())]
    MalformedPath { path: PathBuf, reason: String },

    #[error("invalid npy file '{}': {reason}", path.display())]
    Npy { path: PathBuf, reason: String },

    #[error("cannot decode frame '{}': {reason}", path.display())]
    Frame { path: PathBuf, reason: String },

    #[error("I/O error on '{}'", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DatasetError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        DatasetError::MalformedPath { path: path.into(), reason: reason.into() }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DatasetError::Io { path: path.into(), source }
    }
}
