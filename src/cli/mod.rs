// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
//
//   `train` — trains (or resumes) on a dataset root
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "handcam-trainer",
    version,
    about = "Train a multi-task hand/head-view frame classifier with resumable checkpoints."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Training on data in '{}'", args.data_dir.display());
    if let Some(path) = &args.restore_checkpoint {
        tracing::info!("Resuming from '{}'", path.display());
    }

    let use_case = TrainUseCase::new(args.into());
    let state    = use_case.execute()?;

    println!(
        "Training finished at step {}. Checkpoints in '{}'.",
        state.step,
        use_case.config().logs_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use clap::CommandFactory;
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::parse_from(["handcam-trainer", "train"]);
        let Commands::Train(args) = cli.command;
        let cfg: TrainConfig = args.into();
        let default = TrainConfig::default();

        assert_eq!(cfg.data_dir, default.data_dir);
        assert_eq!(cfg.logs_dir, default.logs_dir);
        assert_eq!(cfg.batch_size, default.batch_size);
        assert_eq!(cfg.num_steps_to_train, default.num_steps_to_train);
        assert_eq!(cfg.max_checkpoints, default.max_checkpoints);
        assert_eq!(cfg.image_size, default.image_size);
        assert!(cfg.restore_checkpoint.is_none());
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from([
            "handcam-trainer", "train", "-d", "/data", "-l", "/logs", "-r", "/logs/model-1000.mpk.gz",
            "--num-steps-to-train", "500",
        ]);
        let Commands::Train(args) = cli.command;
        assert_eq!(args.data_dir, PathBuf::from("/data"));
        assert_eq!(args.logs_dir, PathBuf::from("/logs"));
        assert_eq!(args.restore_checkpoint, Some(PathBuf::from("/logs/model-1000.mpk.gz")));
        assert_eq!(args.num_steps_to_train, 500);
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["handcam-trainer", "inspect", "logs/model-20.mpk.gz"]).is_err());
    }
}
