// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates one training run in order:
//
//   Step 1: Validate config and create the logs directory
//   Step 2: Save train_config.json                 (Layer 6 - infra)
//   Step 3: Load per-session label arrays          (Layer 4 - data)
//   Step 4: Index the hand-view frames             (Layer 4 - data)
//   Step 5: Pair frames with head views + labels   (Layer 4 - data)
//   Step 6: Open checkpoint manager + metrics log  (Layer 6 - infra)
//   Step 7: Run the training loop                  (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::HandCamDataset,
    frames::FrameDecoder,
    index::SampleIndex,
    labels::LabelStore,
};
use crate::domain::session::Split;
use crate::infra::{
    checkpoint::CheckpointManager,
    history::RunState,
    metrics::MetricsLogger,
};
use crate::ml::{model::HandCamModelConfig, trainer::run_training};

pub const CONFIG_FILE: &str = "train_config.json";

// ─── Training Configuration ──────────────────────────────────────────────────
// Every knob of a run. Saved next to the checkpoints so a run
// can be inspected or reproduced later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:               PathBuf,
    pub logs_dir:               PathBuf,
    pub restore_checkpoint:     Option<PathBuf>,
    pub batch_size:             usize,
    pub lr:                     f64,
    pub decay_steps:            usize,
    pub decay_rate:             f64,
    pub num_steps_to_show_loss: usize,
    pub num_steps_to_snapshot:  usize,
    pub num_steps_to_train:     usize,
    pub max_checkpoints:        usize,
    pub num_workers:            usize,
    pub image_size:             usize,
    pub seed:                   u64,
    pub model:                  HandCamModelConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:               PathBuf::from("./data"),
            logs_dir:               PathBuf::from("./logs"),
            restore_checkpoint:     None,
            batch_size:             16,
            lr:                     1e-3,
            decay_steps:            8000,
            decay_rate:             0.1,
            num_steps_to_show_loss: 20,
            num_steps_to_snapshot:  1000,
            num_steps_to_train:     30000,
            max_checkpoints:        10,
            num_workers:            8,
            image_size:             224,
            seed:                   42,
            model:                  HandCamModelConfig::new(),
        }
    }
}

impl TrainConfig {
    /// Reject settings the loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("batch size", self.batch_size),
            ("steps to show loss", self.num_steps_to_show_loss),
            ("steps to snapshot", self.num_steps_to_snapshot),
            ("steps to train", self.num_steps_to_train),
            ("max checkpoints", self.max_checkpoints),
            ("image size", self.image_size),
        ];
        for (name, value) in positive {
            if value == 0 {
                bail!("{name} must be at least 1");
            }
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            bail!("learning rate must be a positive number, got {}", self.lr);
        }
        if !(self.decay_rate.is_finite() && self.decay_rate > 0.0) {
            bail!("decay rate must be a positive number, got {}", self.decay_rate);
        }

        self.model
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid model config: {e}"))?;

        // Every stage halves the frame; it must not shrink below 1 px
        let min_size = 1usize << self.model.stage_channels.len();
        if self.image_size < min_size {
            bail!(
                "image size {} is too small for {} pooling stages (need at least {})",
                self.image_size,
                self.model.stage_channels.len(),
                min_size
            );
        }
        Ok(())
    }

    pub fn save(&self, logs_dir: &Path) -> Result<()> {
        let path = logs_dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Run training to the step budget; returns the final state.
    pub fn execute(&self) -> Result<RunState> {
        let cfg = &self.config;

        // ── Step 1: Validate + logs directory ─────────────────────────────────
        cfg.validate()?;
        fs::create_dir_all(&cfg.logs_dir).with_context(|| {
            format!("Cannot create logs directory '{}'", cfg.logs_dir.display())
        })?;

        // ── Step 2: Save config ───────────────────────────────────────────────
        cfg.save(&cfg.logs_dir)?;

        // ── Step 3: Labels ────────────────────────────────────────────────────
        tracing::info!("Loading labels from '{}'", cfg.data_dir.display());
        let labels = LabelStore::load(&cfg.data_dir, Split::Train)
            .context("Cannot load label arrays")?;

        // ── Step 4: Frame index ───────────────────────────────────────────────
        let index = SampleIndex::enumerate(&cfg.data_dir, Split::Train)
            .context("Cannot index training frames")?;

        // ── Step 5: Dataset ───────────────────────────────────────────────────
        let size = u32::try_from(cfg.image_size).context("image size does not fit in u32")?;
        let dataset = HandCamDataset::build(&index, &labels, FrameDecoder::new(size))
            .context("Frames and label arrays disagree")?;

        // ── Step 6: Checkpoints + metrics ─────────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.logs_dir, cfg.max_checkpoints)?;
        let metrics      = MetricsLogger::new(&cfg.logs_dir)?;
        if cfg.restore_checkpoint.is_none() {
            if let Some(latest) = ckpt_manager.latest()? {
                tracing::warn!(
                    "Starting a fresh run although '{}' exists; pass -r to resume from it",
                    latest.display()
                );
            }
        }

        // ── Step 7: Train (Layer 5) ───────────────────────────────────────────
        run_training(cfg, dataset, &ckpt_manager, &metrics)
    }
}
