//! Finite-difference random search over linear policy weights.
//!
//! Every iteration draws a perturbation `δ` with entries in `[0, 1)`,
//! evaluates `W + δ` and `W - δ`, and proposes
//! `W' = W + lr · (R+ - R-) · δ`. The proposal replaces `W` when its reward
//! beats the best seen so far, or unconditionally once `stale_limit`
//! consecutive proposals have been rejected. A forced acceptance also
//! overwrites the best reward, so the bar can go down as well as up.

use std::time::Instant;

use rand::Rng;
use serde::Serialize;

use super::env::{EnvConfig, Environment};
use super::error::SearchError;
use super::policy::Matrix;
use super::rollout::run_episode;
use crate::config::SearchConfig;

/// Everything the search carries from one iteration to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub weights: Matrix,
    pub best_reward: f64,
    pub learning_rate: f64,
    /// Consecutive rejected iterations.
    pub stale_iterations: usize,
    /// Accepted updates so far.
    pub updates: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// `forced` is set when the candidate did not beat the best reward and was
    /// taken only because the stale limit was reached.
    Accepted { forced: bool },
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    pub iteration: usize,
    pub pos_reward: f64,
    pub neg_reward: f64,
    pub candidate_reward: f64,
    pub decision: Decision,
}

/// Passed to the caller on every accepted update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateEvent {
    pub iteration: usize,
    pub reward: f64,
    /// Learning rate after decay.
    pub learning_rate: f64,
    pub forced: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub environment: String,
    pub iterations: usize,
    pub updates: usize,
    pub best_reward: f64,
    pub final_learning_rate: f64,
    pub elapsed_secs: f64,
    pub weights: Matrix,
}

pub struct FiniteDifferenceSearch {
    config: SearchConfig,
    state: SearchState,
}

impl FiniteDifferenceSearch {
    /// Starts from all-zero weights shaped for `env`.
    pub fn new(config: SearchConfig, env: &EnvConfig) -> Self {
        let state = SearchState {
            weights: Matrix::zeros(env.action_dim, env.obs_dim),
            best_reward: config.initial_best_reward,
            learning_rate: config.learning_rate,
            stale_iterations: 0,
            updates: 0,
        };
        FiniteDifferenceSearch { config, state }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// One iteration with a perturbation drawn from `rng`.
    pub fn iterate<E, R>(
        &mut self,
        iteration: usize,
        env: &mut E,
        rng: &mut R,
    ) -> Result<IterationReport, SearchError>
    where
        E: Environment + ?Sized,
        R: Rng + ?Sized,
    {
        let w = &self.state.weights;
        let noise = Matrix::random_uniform(w.rows(), w.cols(), rng);
        self.iterate_with_noise(iteration, env, &noise)
    }

    /// One iteration with a caller-supplied perturbation.
    pub fn iterate_with_noise<E>(
        &mut self,
        iteration: usize,
        env: &mut E,
        noise: &Matrix,
    ) -> Result<IterationReport, SearchError>
    where
        E: Environment + ?Sized,
    {
        let weights = &self.state.weights;
        let pos_reward = run_episode(env, &weights.add(noise), false)?.total_reward;
        let neg_reward = run_episode(env, &weights.sub(noise), false)?.total_reward;

        let step = self.state.learning_rate * (pos_reward - neg_reward);
        let candidate = weights.scaled_add(noise, step);
        let candidate_reward = run_episode(env, &candidate, false)?.total_reward;

        let improved = candidate_reward > self.state.best_reward;
        let decision = if improved || self.state.stale_iterations >= self.config.stale_limit {
            self.accept(env, candidate, candidate_reward)?;
            Decision::Accepted { forced: !improved }
        } else {
            self.state.stale_iterations += 1;
            tracing::debug!(
                iteration,
                candidate_reward,
                best = self.state.best_reward,
                stale = self.state.stale_iterations,
                "candidate rejected"
            );
            Decision::Rejected
        };

        Ok(IterationReport {
            iteration,
            pos_reward,
            neg_reward,
            candidate_reward,
            decision,
        })
    }

    fn accept<E>(&mut self, env: &mut E, weights: Matrix, reward: f64) -> Result<(), SearchError>
    where
        E: Environment + ?Sized,
    {
        let state = &mut self.state;
        state.stale_iterations = 0;
        state.updates += 1;
        state.learning_rate /= 1.0 + self.config.decay * state.updates as f64;
        state.weights = weights;
        if self.config.render_accepted {
            run_episode(env, &state.weights, true)?;
        }
        state.best_reward = reward;
        Ok(())
    }

    /// Runs `max_iterations` iterations, calling `on_update` after every
    /// accepted update.
    pub fn run<E, R, F>(
        &mut self,
        env: &mut E,
        rng: &mut R,
        mut on_update: F,
    ) -> Result<RunSummary, SearchError>
    where
        E: Environment + ?Sized,
        R: Rng + ?Sized,
        F: FnMut(&UpdateEvent),
    {
        let start = Instant::now();
        for iteration in 0..self.config.max_iterations {
            let report = self.iterate(iteration, env, rng)?;
            if let Decision::Accepted { forced } = report.decision {
                let event = UpdateEvent {
                    iteration,
                    reward: report.candidate_reward,
                    learning_rate: self.state.learning_rate,
                    forced,
                };
                tracing::info!(
                    iteration,
                    reward = event.reward,
                    lr = event.learning_rate,
                    forced,
                    updates = self.state.updates,
                    "weights updated"
                );
                on_update(&event);
            }
        }

        Ok(RunSummary {
            environment: env.config().name.clone(),
            iterations: self.config.max_iterations,
            updates: self.state.updates,
            best_reward: self.state.best_reward,
            final_learning_rate: self.state.learning_rate,
            elapsed_secs: start.elapsed().as_secs_f64(),
            weights: self.state.weights.clone(),
        })
    }
}
