use anyhow::{ensure, Result};

/// Hyperparameters of a search run.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub env_name: String,
    pub learning_rate: f64,
    /// Learning rate decay per accepted update (0 keeps it constant).
    pub decay: f64,
    pub max_iterations: usize,
    /// Consecutive rejections after which the next candidate is accepted regardless.
    pub stale_limit: usize,
    /// Best reward assumed before the first evaluation.
    pub initial_best_reward: f64,
    /// Re-run every accepted policy with rendering on.
    pub render_accepted: bool,
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            env_name: crate::experiments::env::DEFAULT_ENV.to_string(),
            learning_rate: 0.3,
            decay: 0.0,
            max_iterations: 2000,
            stale_limit: 1_000_000,
            initial_best_reward: -1000.0,
            render_accepted: true,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.learning_rate.is_finite(), "learning rate must be finite, got {}", self.learning_rate);
        ensure!(self.decay.is_finite() && self.decay >= 0.0, "decay must be >= 0, got {}", self.decay);
        ensure!(self.max_iterations >= 1, "max iterations must be at least 1");
        ensure!(!self.initial_best_reward.is_nan(), "initial best reward must not be NaN");
        Ok(())
    }
}
