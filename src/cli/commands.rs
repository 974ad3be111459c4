// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the `train` subcommand and all its configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the hand/head-view classifier, optionally resuming a checkpoint
    Train(TrainArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Dataset root holding frames/ and labels/
    #[arg(short = 'd', long, default_value = "./data")]
    pub data_dir: PathBuf,

    /// Where checkpoints, loss history, metrics and config are written
    #[arg(short = 'l', long, default_value = "./logs")]
    pub logs_dir: PathBuf,

    /// Checkpoint file (model-<step>.mpk.gz) to resume from
    #[arg(short = 'r', long)]
    pub restore_checkpoint: Option<PathBuf>,

    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Initial learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Steps between learning-rate drops
    #[arg(long, default_value_t = 8000)]
    pub decay_steps: usize,

    /// Factor applied at every learning-rate drop
    #[arg(long, default_value_t = 0.1)]
    pub decay_rate: f64,

    #[arg(long, default_value_t = 20)]
    pub num_steps_to_show_loss: usize,

    #[arg(long, default_value_t = 1000)]
    pub num_steps_to_snapshot: usize,

    /// Total optimizer steps; training stops exactly here
    #[arg(long, default_value_t = 30000)]
    pub num_steps_to_train: usize,

    /// Checkpoints kept on disk; the oldest step is deleted first
    #[arg(long, default_value_t = 10)]
    pub max_checkpoints: usize,

    /// Data loader worker threads
    #[arg(long, default_value_t = 8)]
    pub num_workers: usize,

    /// Frames are resized to image_size x image_size
    #[arg(long, default_value_t = 224)]
    pub image_size: usize,

    /// Seeds parameter init and shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:               a.data_dir,
            logs_dir:               a.logs_dir,
            restore_checkpoint:     a.restore_checkpoint,
            batch_size:             a.batch_size,
            lr:                     a.lr,
            decay_steps:            a.decay_steps,
            decay_rate:             a.decay_rate,
            num_steps_to_show_loss: a.num_steps_to_show_loss,
            num_steps_to_snapshot:  a.num_steps_to_snapshot,
            num_steps_to_train:     a.num_steps_to_train,
            max_checkpoints:        a.max_checkpoints,
            num_workers:            a.num_workers,
            image_size:             a.image_size,
            seed:                   a.seed,
            ..TrainConfig::default()
        }
    }
}

