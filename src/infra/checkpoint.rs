// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Persists (step, model record, optimizer record) so a run can
// resume exactly where it stopped, and keeps at most `maximum`
// checkpoints in the logs directory.
//
// One file per checkpoint, written with Burn's named MessagePack
// recorder (gzip-compressed, full precision):
//
//   logs/
//     model-1000.mpk.gz
//     model-2000.mpk.gz
//     ...
//
// The stored record is the tuple (step, model, optimizer). A
// file that is truncated or does not match the model layout
// fails to load and is reported as Corrupt.
//
// Retention is FIFO by step: before writing, the lowest-step
// checkpoints are deleted until there is room for the new one.
// Re-saving a step already on disk replaces it in place.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use std::{
    fs,
    path::{Path, PathBuf},
};

use burn::{
    module::AutodiffModule,
    optim::Optimizer,
    prelude::*,
    record::{
        FileRecorder, FullPrecisionSettings, NamedMpkGzFileRecorder, Record, Recorder, RecorderError,
    },
    tensor::backend::AutodiffBackend,
};
use thiserror::Error;

type CheckpointRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

const FILE_PREFIX: &str = "model-";
const FILE_SUFFIX: &str = ".mpk.gz";
const PARTIAL_MARK: &str = "-partial";

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("corrupt checkpoint '{}': {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("checkpoint I/O failed on '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write checkpoint '{}': {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    #[error("checkpoint maximum must be at least 1")]
    InvalidMaximum,
}

impl CheckpointError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }
}

/// Model and optimizer restored from a checkpoint, plus its step.
pub struct Restored<M, O> {
    pub step:      usize,
    pub model:     M,
    pub optimizer: O,
}

/// Step encoded in a checkpoint file name, if it is one.
pub fn step_from_file_name(name: &str) -> Option<usize> {
    name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?.parse().ok()
}

// The file recorder appends its own extension
fn recorder_stem(path: &Path) -> PathBuf {
    match path.file_name().and_then(|n| n.to_str()).and_then(|n| n.strip_suffix(FILE_SUFFIX)) {
        Some(stem) => path.with_file_name(stem),
        None => path.to_path_buf(),
    }
}

/// Owns the checkpoint files of one logs directory.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    dir:     PathBuf,
    maximum: usize,
}

impl CheckpointManager {
    /// Creates `dir` if needed. `maximum` must be at least 1.
    pub fn new(dir: impl Into<PathBuf>, maximum: usize) -> Result<Self, CheckpointError> {
        if maximum == 0 {
            return Err(CheckpointError::InvalidMaximum);
        }
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| CheckpointError::io(&dir, e))?;
        Ok(Self { dir, maximum })
    }

    pub fn path_for(&self, step: usize) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{step}{FILE_SUFFIX}"))
    }

    /// Steps of the checkpoints currently on disk, ascending.
    pub fn steps(&self) -> Result<Vec<usize>, CheckpointError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| CheckpointError::io(&self.dir, e))?;
        let mut steps = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CheckpointError::io(&self.dir, e))?;
            if let Some(step) = entry.file_name().to_str().and_then(step_from_file_name) {
                steps.push(step);
            }
        }
        steps.sort_unstable();
        Ok(steps)
    }

    /// Path of the highest-step checkpoint, if any.
    pub fn latest(&self) -> Result<Option<PathBuf>, CheckpointError> {
        Ok(self.steps()?.last().map(|&step| self.path_for(step)))
    }

    /// Snapshot a live model/optimizer pair at `step`.
    pub fn save<B, M, O>(&self, step: usize, model: &M, optimizer: &O) -> Result<PathBuf, CheckpointError>
    where
        B: AutodiffBackend,
        M: AutodiffModule<B>,
        O: Optimizer<M, B>,
    {
        self.store::<B, _>(step, (step, model.clone().into_record(), optimizer.to_record()))
    }

    /// Evict down to `maximum - 1` other checkpoints, then write `record`.
    fn store<B, R>(&self, step: usize, record: R) -> Result<PathBuf, CheckpointError>
    where
        B: Backend,
        R: Record<B>,
    {
        let mut steps = self.steps()?;
        steps.retain(|&s| s != step);
        while steps.len() >= self.maximum {
            let oldest = steps.remove(0);
            let path   = self.path_for(oldest);
            fs::remove_file(&path).map_err(|e| CheckpointError::io(&path, e))?;
            tracing::debug!("Removed old checkpoint '{}'", path.display());
        }

        // Written under a name `steps` never matches, then renamed into place
        let path    = self.path_for(step);
        let partial = self.dir.join(format!("{FILE_PREFIX}{step}{PARTIAL_MARK}"));
        Recorder::<B>::record(&CheckpointRecorder::new(), record, partial.clone())
            .map_err(|e| CheckpointError::Write { path: path.clone(), reason: e.to_string() })?;

        let written = partial.with_extension(<CheckpointRecorder as FileRecorder<B>>::file_extension());
        fs::rename(&written, &path).map_err(|e| CheckpointError::io(&path, e))?;

        tracing::info!("Saved checkpoint '{}'", path.display());
        Ok(path)
    }

    /// Read a checkpoint into `model` and `optimizer`.
    pub fn load<B, M, O>(
        path:      &Path,
        model:     M,
        optimizer: O,
        device:    &B::Device,
    ) -> Result<Restored<M, O>, CheckpointError>
    where
        B: AutodiffBackend,
        M: AutodiffModule<B>,
        O: Optimizer<M, B>,
    {
        // Checked up front so a missing file is I/O, not Corrupt
        fs::metadata(path).map_err(|e| CheckpointError::io(path, e))?;

        let (step, model_record, optim_record): (usize, M::Record, O::Record) =
            Recorder::<B>::load(&CheckpointRecorder::new(), recorder_stem(path), device)
                .map_err(|e| corrupt(path, e))?;

        tracing::debug!("Read checkpoint '{}' at step {}", path.display(), step);
        Ok(Restored {
            step,
            model:     model.load_record(model_record),
            optimizer: optimizer.load_record(optim_record),
        })
    }
}

fn corrupt(path: &Path, e: RecorderError) -> CheckpointError {
    CheckpointError::Corrupt { path: path.to_path_buf(), reason: e.to_string() }
}
