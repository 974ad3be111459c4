// ============================================================
// Layer 6 — Run State and Loss History
// ============================================================
// The loss history is a list of (step, loss) points, one per
// show-loss interval. It lives next to the checkpoints as
//
//   logs/losses.json   → [[20, 7.91], [40, 7.42], ...]
//
// and is rewritten in full at every snapshot. On resume the
// file may be ahead of the checkpoint being restored (a later
// snapshot was written and then deleted, or the run crashed
// between the two writes), so points past the restored step
// are dropped.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const HISTORY_FILE: &str = "losses.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LossHistory {
    points: Vec<(usize, f64)>,
}

impl LossHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: usize, loss: f64) {
        self.points.push((step, loss));
    }

    /// Drop every point recorded after `step`.
    pub fn truncate_to(&mut self, step: usize) {
        self.points.retain(|&(s, _)| s <= step);
    }

    pub fn points(&self) -> &[(usize, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn path(logs_dir: &Path) -> PathBuf {
        logs_dir.join(HISTORY_FILE)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read loss history '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Loss history '{}' is not valid JSON", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write loss history '{}'", path.display()))?;
        tracing::debug!("Saved {} loss points to '{}'", self.len(), path.display());
        Ok(())
    }
}

/// Training progress carried across snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunState {
    pub step:    usize,
    pub history: LossHistory,
}

impl RunState {
    /// Step 0, empty history.
    pub fn fresh() -> Self {
        Self::default()
    }

    /// State for a run resumed at `step`.
    ///
    /// A missing history file is not fatal: the run continues
    /// with an empty history and a warning.
    pub fn restore(step: usize, logs_dir: &Path) -> Result<Self> {
        let path = LossHistory::path(logs_dir);
        let mut history = if path.exists() {
            LossHistory::load(&path)?
        } else {
            tracing::warn!(
                "No loss history at '{}'; resuming at step {} with an empty history",
                path.display(),
                step
            );
            LossHistory::new()
        };

        let before = history.len();
        history.truncate_to(step);
        if history.len() < before {
            tracing::info!(
                "Dropped {} loss points recorded after step {}",
                before - history.len(),
                step
            );
        }
        Ok(Self { step, history })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_truncates_future_points() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = LossHistory::new();
        for step in (200..=1200).step_by(200) {
            history.push(step, 1.0 / step as f64);
        }
        history.save(&LossHistory::path(dir.path())).unwrap();

        let state = RunState::restore(1000, dir.path()).unwrap();
        assert_eq!(state.step, 1000);
        assert_eq!(state.history.len(), 5);
        assert!(state.history.points().iter().all(|&(s, _)| s <= 1000));
    }

    #[test]
    fn test_restore_without_history_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = RunState::restore(300, dir.path()).unwrap();
        assert_eq!(state.step, 300);
        assert_eq!(state.history.len(), 0);
    }

    #[test]
    fn test_history_file_is_array_of_pairs() {
        let dir  = tempfile::tempdir().unwrap();
        let path = LossHistory::path(dir.path());
        let mut history = LossHistory::new();
        history.push(20, 0.5);
        history.save(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[[20,0.5]]");
        assert_eq!(LossHistory::load(&path).unwrap(), history);
    }

    #[test]
    fn test_corrupt_history_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(LossHistory::path(dir.path()), b"{not json").unwrap();
        assert!(RunState::restore(10, dir.path()).is_err());
    }

    #[test]
    fn test_fresh_state() {
        let state = RunState::fresh();
        assert_eq!(state.step, 0);
        assert_eq!(state.history.len(), 0);
    }
}
