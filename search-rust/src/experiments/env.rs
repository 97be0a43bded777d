//! Environment abstraction for policy search.
//!
//! Follows the gymnasium API shape: `reset`, `step`, `render`, `close`, plus
//! static metadata. Everything here is continuous control; actions are
//! unbounded f64 vectors that each environment clips to its own range.

use std::collections::BTreeMap;
use std::fmt;

use super::error::{EnvError, SearchError};

/// Result of a step.
#[derive(Debug, Clone, Default)]
pub struct StepResult {
    pub observation: Vec<f64>,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    /// Diagnostic values that are not part of the observation.
    pub info: BTreeMap<&'static str, f64>,
}

impl StepResult {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Static metadata of an environment.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    pub name: String,
    pub obs_dim: usize,
    pub action_dim: usize,
    /// Per-episode step limit.
    pub max_steps: usize,
}

/// The core Environment trait.
///
/// One instance is a single mutable simulation; rollouts reset it and
/// drive it to completion one at a time.
pub trait Environment {
    /// Reset to an initial state and return the first observation.
    fn reset(&mut self, seed: Option<u64>) -> Vec<f64>;

    /// Advance one control step.
    fn step(&mut self, action: &[f64]) -> Result<StepResult, EnvError>;

    /// Draw the current state.
    fn render(&mut self);

    /// Tear down whatever `render` set up.
    fn close(&mut self);

    fn config(&self) -> &EnvConfig;

    /// Steps taken since the last reset.
    fn steps(&self) -> usize;
}

pub(crate) fn check_action(config: &EnvConfig, action: &[f64]) -> Result<(), EnvError> {
    if action.len() != config.action_dim {
        return Err(EnvError::ActionShape {
            env: config.name.clone(),
            expected: config.action_dim,
            got: action.len(),
        });
    }
    Ok(())
}

/// Text visualization shared by the built-in environments.
///
/// Frames go to the `trace` level so they cost nothing unless asked for.
#[derive(Debug, Default)]
pub(crate) struct TextView {
    frames: usize,
    first_x: Option<f64>,
    last_x: f64,
}

impl TextView {
    pub(crate) fn frame(&mut self, env: &str, step: usize, x: f64, picture: &str) {
        self.frames += 1;
        self.first_x.get_or_insert(x);
        self.last_x = x;
        tracing::trace!(env, step, x, "{picture}");
    }

    pub(crate) fn close(&mut self, env: &str) {
        if self.frames > 0 {
            let travelled = self.last_x - self.first_x.unwrap_or(self.last_x);
            tracing::debug!(env, frames = self.frames, travelled, "render closed");
        }
        *self = TextView::default();
    }

    #[cfg(test)]
    pub(crate) fn frames(&self) -> usize {
        self.frames
    }
}

/// Lays out `value` in `[lo, hi]` on a strip of `width` cells, marked with `mark`.
pub(crate) fn strip(value: f64, lo: f64, hi: f64, width: usize, mark: char) -> String {
    let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
    let pos = (t * (width - 1) as f64).round() as usize;
    (0..width).map(|i| if i == pos { mark } else { '.' }).collect()
}

pub const SWIMMER: &str = "Swimmer-v1";
pub const DEFAULT_ENV: &str = SWIMMER;

/// Parses `Pendulum-<N>Link`.
fn pendulum_links(name: &str) -> Option<usize> {
    let n: usize = name.strip_prefix("Pendulum-")?.strip_suffix("Link")?.parse().ok()?;
    (1..=super::pendulum::MAX_LINKS).contains(&n).then_some(n)
}

/// Registry of known environments.
pub fn get_env_config(name: &str) -> Option<EnvConfig> {
    if name == SWIMMER {
        return Some(super::swimmer::config());
    }
    pendulum_links(name).map(super::pendulum::config)
}

/// Factory: create an environment by name.
pub fn make(name: &str, seed: Option<u64>) -> Result<Box<dyn Environment>, SearchError> {
    if name == SWIMMER {
        return Ok(Box::new(super::swimmer::Swimmer::new(seed)));
    }
    match pendulum_links(name) {
        Some(n) => Ok(Box::new(super::pendulum::NLinkPendulum::new(n, seed))),
        None => Err(SearchError::UnknownEnvironment(name.to_string())),
    }
}

impl fmt::Display for EnvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (obs={}, act={}, steps≤{})",
            self.name, self.obs_dim, self.action_dim, self.max_steps
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_swimmer() {
        let cfg = get_env_config("Swimmer-v1").unwrap();
        assert_eq!(cfg.obs_dim, 8);
        assert_eq!(cfg.action_dim, 2);
        assert_eq!(cfg.max_steps, 1000);
    }

    #[test]
    fn test_registry_pendulum() {
        let cfg = get_env_config("Pendulum-3Link").unwrap();
        assert_eq!(cfg.obs_dim, 9);
        assert_eq!(cfg.action_dim, 3);
        assert!(get_env_config("Pendulum-0Link").is_none());
        assert!(get_env_config("Pendulum-xLink").is_none());
        assert!(get_env_config("Pendulum-99Link").is_none());
    }

    #[test]
    fn test_make_unknown() {
        match make("BipedalWalker-v2", None) {
            Err(SearchError::UnknownEnvironment(name)) => assert_eq!(name, "BipedalWalker-v2"),
            _ => panic!("expected UnknownEnvironment"),
        }
    }

    #[test]
    fn test_make_matches_registry() {
        for name in ["Swimmer-v1", "Pendulum-1Link", "Pendulum-5Link"] {
            let env = make(name, Some(1)).unwrap();
            assert_eq!(env.config(), &get_env_config(name).unwrap());
        }
    }

    #[test]
    fn test_check_action() {
        let cfg = get_env_config("Swimmer-v1").unwrap();
        assert!(check_action(&cfg, &[0.0, 0.0]).is_ok());
        assert_eq!(
            check_action(&cfg, &[0.0]),
            Err(EnvError::ActionShape { env: "Swimmer-v1".into(), expected: 2, got: 1 })
        );
    }

    #[test]
    fn test_strip() {
        assert_eq!(strip(0.0, -1.0, 1.0, 5, 'o'), "..o..");
        assert_eq!(strip(-9.0, -1.0, 1.0, 5, 'o'), "o....");
        assert_eq!(strip(9.0, -1.0, 1.0, 5, 'o'), "....o");
    }

    #[test]
    fn test_text_view_close_resets() {
        let mut view = TextView::default();
        view.frame("t", 0, 0.0, "a");
        view.frame("t", 1, 0.5, "b");
        assert_eq!(view.frames(), 2);
        view.close("t");
        assert_eq!(view.frames(), 0);
    }
}
