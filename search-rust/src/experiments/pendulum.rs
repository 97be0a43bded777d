//! N-link pendulum with every joint actuated.
//!
//! Links hang from a fixed pivot and start pointing down; reward favours
//! raising the tip while keeping velocities and torques small.
//!
//! Physics: a reduced chain model integrated with semi-implicit Euler.
//! - Joint i carries the weight of every link outboard of it
//! - Inertia seen by joint i grows with the number of links it moves
//! - Viscous damping on every joint, angular velocity capped at 8 rad/s
//! - Joints are coupled only through gravity, which is enough for
//!   black-box search
//!
//! Observation (3N): `[cos θ, sin θ, ω]` per link, θ relative to the parent.
//! Action (N): joint torques, clipped to [-1, 1].
//! Reward: normalized tip height in [0, 1] − 0.01·Σω² − 0.01·Στ², with τ the
//! clipped torque, so the reward is bounded for any action.
//! Episode: never terminates; truncated at 500 steps (N ≤ 3) or 1000.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::env::{check_action, strip, EnvConfig, Environment, StepResult, TextView};
use super::error::EnvError;

pub const MAX_LINKS: usize = 10;

// ─── Constants ────────────────────────────────────────────────────────
const GRAVITY: f64 = 9.81;
const LINK_LENGTH: f64 = 1.0;
const LINK_MASS: f64 = 1.0;
const DT: f64 = 0.05; // 20 Hz control
const MAX_TORQUE: f64 = 1.0;
const MAX_OMEGA: f64 = 8.0;
const DAMPING: f64 = 0.1;
const VEL_PENALTY: f64 = 0.01;
const CTRL_COST_WEIGHT: f64 = 0.01;
const INIT_NOISE: f64 = 0.1;

pub(crate) fn config(links: usize) -> EnvConfig {
    EnvConfig {
        name: format!("Pendulum-{links}Link"),
        obs_dim: 3 * links,
        action_dim: links,
        max_steps: if links <= 3 { 500 } else { 1000 },
    }
}

// ─── Environment ──────────────────────────────────────────────────────

pub struct NLinkPendulum {
    config: EnvConfig,
    /// Relative joint angles; 0 points straight up.
    theta: Vec<f64>,
    omega: Vec<f64>,
    step_count: usize,
    rng: StdRng,
    view: TextView,
}

impl NLinkPendulum {
    pub fn new(links: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let mut env = NLinkPendulum {
            config: config(links),
            theta: vec![0.0; links],
            omega: vec![0.0; links],
            step_count: 0,
            rng,
            view: TextView::default(),
        };
        env.reset(None);
        env
    }

    fn links(&self) -> usize {
        self.theta.len()
    }

    fn observation(&self) -> Vec<f64> {
        self.theta
            .iter()
            .zip(&self.omega)
            .flat_map(|(t, w)| [t.cos(), t.sin(), *w])
            .collect()
    }

    /// Vertical position of the free end, in `[-N L, N L]`.
    fn tip_height(&self) -> f64 {
        self.theta
            .iter()
            .scan(0.0, |abs, t| {
                *abs += t;
                Some(LINK_LENGTH * abs.cos())
            })
            .sum()
    }

    /// Horizontal position of the free end.
    fn tip_offset(&self) -> f64 {
        self.theta
            .iter()
            .scan(0.0, |abs, t| {
                *abs += t;
                Some(LINK_LENGTH * abs.sin())
            })
            .sum()
    }
}

impl Environment for NLinkPendulum {
    fn reset(&mut self, seed: Option<u64>) -> Vec<f64> {
        if let Some(s) = seed {
            self.rng = StdRng::seed_from_u64(s);
        }
        for i in 0..self.links() {
            self.theta[i] = PI + self.rng.gen_range(-INIT_NOISE..INIT_NOISE);
            self.omega[i] = self.rng.gen_range(-INIT_NOISE..INIT_NOISE);
        }
        self.step_count = 0;
        self.observation()
    }

    fn step(&mut self, action: &[f64]) -> Result<StepResult, EnvError> {
        check_action(&self.config, action)?;
        let n = self.links();

        // Absolute angle of every link.
        let absolute: Vec<f64> = self
            .theta
            .iter()
            .scan(0.0, |abs, t| {
                *abs += t;
                Some(*abs)
            })
            .collect();
        let torque: Vec<f64> = action.iter().map(|a| a.clamp(-1.0, 1.0) * MAX_TORQUE).collect();

        for i in 0..n {
            // Gravity on the links outboard of joint i.
            let gravity: f64 = (i..n)
                .map(|j| -LINK_MASS * (n - j) as f64 * GRAVITY * LINK_LENGTH * absolute[j].sin())
                .sum();
            let inertia = LINK_MASS * LINK_LENGTH * LINK_LENGTH * (n - i) as f64;
            let alpha = (gravity + torque[i] - DAMPING * self.omega[i]) / inertia;
            self.omega[i] = (self.omega[i] + alpha * DT).clamp(-MAX_OMEGA, MAX_OMEGA);
            self.theta[i] += self.omega[i] * DT;
        }

        let reach = n as f64 * LINK_LENGTH;
        let height = self.tip_height();
        let height_reward = (height + reach) / (2.0 * reach);
        let vel_cost = VEL_PENALTY * self.omega.iter().map(|w| w * w).sum::<f64>();
        let ctrl_cost = CTRL_COST_WEIGHT * torque.iter().map(|t| t * t).sum::<f64>();

        self.step_count += 1;
        let mut result = StepResult {
            observation: self.observation(),
            reward: height_reward - vel_cost - ctrl_cost,
            terminated: false,
            truncated: self.step_count >= self.config.max_steps,
            ..Default::default()
        };
        result.info.insert("tip_height", height);
        result.info.insert("ctrl_cost", ctrl_cost);
        Ok(result)
    }

    fn render(&mut self) {
        let reach = self.links() as f64 * LINK_LENGTH;
        let x = self.tip_offset();
        let picture = format!(
            "{} height {:+.2}",
            strip(x, -reach, reach, 31, 'o'),
            self.tip_height()
        );
        self.view.frame(&self.config.name, self.step_count, x, &picture);
    }

    fn close(&mut self) {
        self.view.close(&self.config.name);
    }

    fn config(&self) -> &EnvConfig {
        &self.config
    }

    fn steps(&self) -> usize {
        self.step_count
    }
}

// ─── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pendulum_reset_hangs_down() {
        let mut env = NLinkPendulum::new(2, Some(42));
        let obs = env.reset(Some(42));
        assert_eq!(obs.len(), 6);
        assert!(obs[0] < -0.9, "cos(PI) should be near -1, got {}", obs[0]);
    }

    #[test]
    fn test_pendulum_single_link_tip() {
        let mut env = NLinkPendulum::new(1, Some(0));
        env.theta[0] = 0.0;
        assert!((env.tip_height() - 1.0).abs() < 1e-12);
        env.theta[0] = PI;
        assert!((env.tip_height() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pendulum_step() {
        let mut env = NLinkPendulum::new(3, Some(42));
        env.reset(Some(42));
        let result = env.step(&[0.5, -0.5, 0.2]).unwrap();
        assert_eq!(result.observation.len(), 9);
        assert!(!result.terminated);
        assert!(result.info["tip_height"].abs() <= 3.0);
    }

    #[test]
    fn test_pendulum_velocity_clamped() {
        let mut env = NLinkPendulum::new(4, Some(5));
        for _ in 0..300 {
            env.step(&[1.0, -1.0, 1.0, -1.0]).unwrap();
        }
        assert!(env.omega.iter().all(|w| w.abs() <= MAX_OMEGA));
    }

    #[test]
    fn test_pendulum_reward_ignores_torque_beyond_limit() {
        for links in [1, 3, 7] {
            let mut saturated = NLinkPendulum::new(links, Some(11));
            let mut huge = NLinkPendulum::new(links, Some(11));
            let a = saturated.step(&vec![1.0; links]).unwrap();
            let b = huge.step(&vec![1e6; links]).unwrap();
            assert_eq!(a.reward, b.reward);
            assert_eq!(a.observation, b.observation);
            assert_eq!(b.info["ctrl_cost"], CTRL_COST_WEIGHT * links as f64);
        }
    }

    #[test]
    fn test_pendulum_reward_is_bounded() {
        let mut env = NLinkPendulum::new(3, Some(2));
        for k in 0..200 {
            let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
            let r = env.step(&[sign * 1e12, -sign * 1e9, 1e300]).unwrap().reward;
            let worst = -(VEL_PENALTY * 3.0 * MAX_OMEGA * MAX_OMEGA + CTRL_COST_WEIGHT * 3.0);
            assert!(r.is_finite());
            assert!((worst - 1e-9..=1.0 + 1e-9).contains(&r), "reward {r} out of range");
        }
    }

    #[test]
    fn test_pendulum_rejects_wrong_action() {
        let mut env = NLinkPendulum::new(2, Some(1));
        assert!(env.step(&[0.0]).is_err());
    }

    #[test]
    fn test_pendulum_truncates_at_limit() {
        let mut env = NLinkPendulum::new(1, Some(1));
        let limit = env.config().max_steps;
        for _ in 1..limit {
            assert!(!env.step(&[0.0]).unwrap().done());
        }
        assert!(env.step(&[0.0]).unwrap().truncated);
    }
}
