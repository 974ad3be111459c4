// ============================================================
// Layer 5 — Learning Rate Schedule
// ============================================================
// Staircase exponential decay on the absolute step:
//
//   lr(step) = initial_lr * decay_rate ^ floor(step / decay_steps)
//
// The exponent uses integer division, so the rate is constant
// within each window of `decay_steps` steps and drops by a
// factor of `decay_rate` at every boundary. A restored run
// picks up the same rate it would have had uninterrupted.
//
// Reference: Krizhevsky et al. (2012) step decay

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningRateSchedule {
    pub initial_lr:  f64,
    pub decay_steps: usize,
    pub decay_rate:  f64,
}

impl LearningRateSchedule {
    pub fn new(initial_lr: f64, decay_steps: usize, decay_rate: f64) -> Self {
        Self { initial_lr, decay_steps, decay_rate }
    }

    /// Learning rate used for the update at `step`.
    pub fn rate(&self, step: usize) -> f64 {
        // decay_steps = 0 disables decay
        if self.decay_steps == 0 {
            return self.initial_lr;
        }
        let exponent = (step / self.decay_steps) as i32;
        self.initial_lr * self.decay_rate.powi(exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12
    }

    #[test]
    fn test_staircase_boundaries() {
        let s = LearningRateSchedule::new(1e-3, 8000, 0.1);
        assert!(close(s.rate(0), 1e-3));
        assert!(close(s.rate(7999), 1e-3));
        assert!(close(s.rate(8000), 1e-4));
        assert!(close(s.rate(15999), 1e-4));
        assert!(close(s.rate(16000), 1e-5));
    }

    #[test]
    fn test_rate_never_increases() {
        let s = LearningRateSchedule::new(1e-2, 7, 0.5);
        let rates: Vec<f64> = (0..100).map(|step| s.rate(step)).collect();
        assert!(rates.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_zero_decay_steps_is_constant() {
        let s = LearningRateSchedule::new(0.3, 0, 0.1);
        assert_eq!(s.rate(1_000_000), 0.3);
    }
}
