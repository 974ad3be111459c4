// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Step-budgeted SGD loop over the shuffled frame-pair loader.
//
//   Initializing ──► Running ──► Snapshotting ──► Running ...
//                       │                            │
//                       └──────────► Terminated ◄────┘
//
//   Initializing  build model + optimizer, or restore both
//                 from a checkpoint (step and loss history
//                 come with it)
//   Running       one optimizer update per batch
//   Snapshotting  every `num_steps_to_snapshot` steps and at
//                 the final step: loss history, then checkpoint
//   Terminated    exactly when step == num_steps_to_train,
//                 even in the middle of an epoch
//
// Learning rate is recomputed from the absolute step before
// every update (see schedule.rs). Epochs repeat, reshuffled by
// the data loader, until the step budget is spent.
//
// Reference: Burn Book §5 (Custom Training Loop)

use std::{sync::Arc, time::Instant};

use anyhow::{bail, Context, Result};
use burn::{
    data::{
        dataloader::{DataLoader, DataLoaderBuilder},
        dataset::Dataset,
    },
    optim::{
        decay::WeightDecayConfig, momentum::MomentumConfig, GradientsParams, Optimizer,
        SgdConfig,
    },
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{HandCamBatch, HandCamBatcher},
    dataset::HandCamDataset,
};
use crate::infra::{
    checkpoint::CheckpointManager,
    history::{LossHistory, RunState},
    metrics::{MetricsLogger, StepMetrics},
};
use crate::ml::{
    loss::LossCompose,
    model::HandCamModel,
    schedule::LearningRateSchedule,
};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

pub const MOMENTUM: f64 = 0.9;
pub const WEIGHT_DECAY: f32 = 5e-4;

// ─── Cadence ──────────────────────────────────────────────────────────────────
/// When to log, snapshot and stop, as a function of the step
/// just completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub show_loss_every: usize,
    pub snapshot_every:  usize,
    pub train_steps:     usize,
}

impl Cadence {
    pub fn from_config(cfg: &TrainConfig) -> Self {
        Self {
            show_loss_every: cfg.num_steps_to_show_loss,
            snapshot_every:  cfg.num_steps_to_snapshot,
            train_steps:     cfg.num_steps_to_train,
        }
    }

    pub fn should_log(&self, step: usize) -> bool {
        step % self.show_loss_every == 0
    }

    pub fn should_snapshot(&self, step: usize) -> bool {
        step % self.snapshot_every == 0 || step == self.train_steps
    }

    pub fn is_finished(&self, step: usize) -> bool {
        step >= self.train_steps
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Initializing,
    Running,
    Snapshotting,
    Terminated,
}

impl LoopPhase {
    fn enter(&mut self, next: LoopPhase) {
        if *self != next {
            tracing::debug!("Loop phase {:?} -> {:?}", self, next);
        }
        *self = next;
    }

    /// Phase entered once `step` has been completed.
    pub fn after_step(step: usize, cadence: &Cadence) -> Self {
        if cadence.should_snapshot(step) {
            LoopPhase::Snapshotting
        } else if cadence.is_finished(step) {
            LoopPhase::Terminated
        } else {
            LoopPhase::Running
        }
    }
}

// ─── Throughput ───────────────────────────────────────────────────────────────
/// Examples per second since the last reset.
#[derive(Debug)]
pub struct Throughput {
    examples: usize,
    started:  Instant,
}

impl Throughput {
    pub fn new() -> Self {
        Self { examples: 0, started: Instant::now() }
    }

    pub fn record(&mut self, examples: usize) {
        self.examples += examples;
    }

    pub fn rate(&self) -> f64 {
        let secs = self.started.elapsed().as_secs_f64();
        if secs > 0.0 { self.examples as f64 / secs } else { 0.0 }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Throughput {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Entry Points ─────────────────────────────────────────────────────────────
pub fn run_training(
    cfg:          &TrainConfig,
    dataset:      HandCamDataset,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
) -> Result<RunState> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop::<MyBackend>(cfg, dataset, ckpt_manager, metrics, device)
}

pub fn sgd_config() -> SgdConfig {
    SgdConfig::new()
        .with_momentum(Some(
            MomentumConfig::new().with_momentum(MOMENTUM).with_dampening(0.0),
        ))
        .with_weight_decay(Some(WeightDecayConfig::new(WEIGHT_DECAY)))
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:          &TrainConfig,
    dataset:      HandCamDataset,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
    device:       B::Device,
) -> Result<RunState> {
    let mut phase = LoopPhase::Initializing;
    let cadence   = Cadence::from_config(cfg);
    let schedule  = LearningRateSchedule::new(cfg.lr, cfg.decay_steps, cfg.decay_rate);

    if dataset.is_empty() {
        bail!("No frame pairs to train on");
    }

    // ── Build or restore model + optimizer ───────────────────────────────────
    B::seed(cfg.seed);
    let mut model: HandCamModel<B> = cfg.model.init(&device);
    let mut optim = sgd_config().init::<B, HandCamModel<B>>();

    let mut state = match &cfg.restore_checkpoint {
        Some(path) => {
            let restored = CheckpointManager::load::<B, _, _>(path, model, optim, &device)
                .with_context(|| format!("Cannot restore from '{}'", path.display()))?;
            model = restored.model;
            optim = restored.optimizer;
            tracing::info!("Restored checkpoint '{}' at step {}", path.display(), restored.step);
            RunState::restore(restored.step, &cfg.logs_dir)?
        }
        None => RunState::fresh(),
    };

    if cadence.is_finished(state.step) {
        tracing::info!(
            "Step {} already reaches the budget of {}; nothing to train",
            state.step,
            cfg.num_steps_to_train
        );
        phase.enter(LoopPhase::Terminated);
        return Ok(state);
    }

    tracing::info!(
        "Model ready: {} parameters, {} frame pairs, starting at step {}",
        model.num_params(),
        dataset.len(),
        state.step
    );

    // ── Data loader ───────────────────────────────────────────────────────────
    let pairs   = dataset.len();
    let batcher = HandCamBatcher::<B>::new(device.clone(), cfg.image_size);
    let loader: Arc<dyn DataLoader<HandCamBatch<B>>> = DataLoaderBuilder::new(batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(cfg.num_workers)
        .build(dataset);

    let loss_fn        = LossCompose::<B>::with_default_weights(&device);
    let history_path   = LossHistory::path(&cfg.logs_dir);
    let mut throughput = Throughput::new();
    let mut epoch      = 0usize;
    phase.enter(LoopPhase::Running);

    // ── Step loop ─────────────────────────────────────────────────────────────
    while phase != LoopPhase::Terminated {
        epoch += 1;
        let mut seen = 0usize;
        tracing::debug!("Starting epoch {} at step {}", epoch, state.step);

        for batch in loader.iter() {
            let examples = batch.len();
            let lr       = schedule.rate(state.step);
            seen += examples;

            let output = model.forward(batch.hand_images, batch.head_images);
            let losses = loss_fn.loss(&output, batch.fa_labels, batch.ges_labels, batch.obj_labels);
            let values = losses.values();
            if let Some(task) = values.non_finite_task() {
                bail!(
                    "Non-finite {} loss at step {} (fa={}, ges={}, obj={})",
                    task.short_name(),
                    state.step + 1,
                    values.fa,
                    values.ges,
                    values.obj
                );
            }

            let grads = losses.total().backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(lr, model, grads);

            state.step += 1;
            throughput.record(examples);
            let step = state.step;

            if cadence.should_log(step) {
                let rate = throughput.rate();
                tracing::info!(
                    "step {:>6} | loss={:.4} (fa={:.4} ges={:.4} obj={:.4}) | lr={:.2e} | {:.1} examples/sec",
                    step, values.total, values.fa, values.ges, values.obj, lr, rate,
                );
                state.history.push(step, values.total);
                metrics.log(&StepMetrics::new(step, values, lr, rate))?;
                throughput.reset();
            }

            phase.enter(LoopPhase::after_step(step, &cadence));
            if phase == LoopPhase::Snapshotting {
                state.history.save(&history_path)?;
                ckpt_manager
                    .save::<B, _, _>(step, &model, &optim)
                    .with_context(|| format!("Cannot snapshot step {step}"))?;
                phase.enter(if cadence.is_finished(step) {
                    LoopPhase::Terminated
                } else {
                    LoopPhase::Running
                });
            }

            if phase == LoopPhase::Terminated {
                break;
            }
        }

        // The loader ends a pass early when a frame pair fails to decode
        if phase != LoopPhase::Terminated && seen < pairs {
            bail!(
                "Epoch {} loaded only {} of {} frame pairs; a frame could not be decoded",
                epoch,
                seen,
                pairs
            );
        }
    }

    tracing::info!("Training complete at step {} after {} epochs", state.step, epoch);
    Ok(state)
}
