// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one CSV row per show-loss interval:
//
//   step,loss,fa_loss,ges_loss,obj_loss,learning_rate,examples_per_sec
//   20,7.912345,0.693001,2.570112,4.649232,0.001000,41.2
//   40,7.420016,0.688210,2.491004,4.240802,0.001000,43.9
//
// The file is opened in append mode so a resumed run keeps
// writing after the rows of the previous run. Rows past the
// restored step are not removed; `step` tells them apart.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

use crate::ml::loss::LossValues;

pub const METRICS_FILE: &str = "metrics.csv";
pub const METRICS_HEADER: &str = "step,loss,fa_loss,ges_loss,obj_loss,learning_rate,examples_per_sec";

/// One row of the metrics CSV
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepMetrics {
    pub step:             usize,
    pub loss:             f64,
    pub fa_loss:          f64,
    pub ges_loss:         f64,
    pub obj_loss:         f64,
    pub learning_rate:    f64,
    pub examples_per_sec: f64,
}

impl StepMetrics {
    pub fn new(step: usize, losses: LossValues, learning_rate: f64, examples_per_sec: f64) -> Self {
        Self {
            step,
            loss:     losses.total,
            fa_loss:  losses.fa,
            ges_loss: losses.ges,
            obj_loss: losses.obj,
            learning_rate,
            examples_per_sec,
        }
    }

    fn csv_row(&self) -> String {
        format!(
            "{},{:.6},{:.6},{:.6},{:.6},{:.6e},{:.1}",
            self.step,
            self.loss,
            self.fa_loss,
            self.ges_loss,
            self.obj_loss,
            self.learning_rate,
            self.examples_per_sec,
        )
    }
}

/// Appends step metrics to `<dir>/metrics.csv`.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create logs directory '{}'", dir.display()))?;

        let csv_path = dir.join(METRICS_FILE);
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{METRICS_HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &StepMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;
        writeln!(f, "{}", m.csv_row())?;
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(step: usize) -> StepMetrics {
        let losses = LossValues { total: 3.0, fa: 0.5, ges: 1.0, obj: 1.5 };
        StepMetrics::new(step, losses, 1e-3, 12.34)
    }

    #[test]
    fn test_rows_are_appended_under_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&metrics(20)).unwrap();

        // A second logger on the same directory (resumed run) keeps the file
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&metrics(40)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], METRICS_HEADER);
        assert!(lines[1].starts_with("20,3.000000,0.500000,1.000000,1.500000,"));
        assert!(lines[2].starts_with("40,"));
        assert!(lines[2].ends_with(",12.3"));
    }

    #[test]
    fn test_row_has_one_field_per_column() {
        let row = metrics(1).csv_row();
        assert_eq!(row.split(',').count(), METRICS_HEADER.split(',').count());
    }
}
