//! Three-segment swimmer in a viscous 2D fluid.
//!
//! Segments are chained by two actuated rotational joints. Motion comes only
//! from anisotropic drag on the segments, so the policy has to discover an
//! undulating gait to make forward progress.
//!
//! Physics: planar rigid chain integrated with semi-implicit Euler.
//! - Each segment's velocity is the centre-of-mass velocity plus its
//!   rotation about the centre of mass
//! - Drag across a segment is 5x the drag along it, which turns a
//!   travelling wave into thrust
//! - Joint torques react on the body; joints stop hard at ±1.5 rad
//!
//! Observation (8): [body_angle, joint1_angle, joint2_angle,
//!                   vx, vy, body_angular_vel, joint1_vel, joint2_vel]
//! Action (2): [torque1, torque2], clipped to [-1, 1].
//! Reward: x velocity of the centre of mass − 0.0001 · Στ².
//! Episode: never terminates; truncated at 1000 steps.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::env::{check_action, strip, EnvConfig, Environment, StepResult, TextView, SWIMMER};
use super::error::EnvError;

// ─── Constants ────────────────────────────────────────────────────────
const SEGMENTS: usize = 3;
const JOINTS: usize = SEGMENTS - 1;
const SEGMENT_LENGTH: f64 = 0.1;
const SEGMENT_MASS: f64 = 1.0;
/// Thin rod about its centre: m L² / 12.
const SEGMENT_INERTIA: f64 = SEGMENT_MASS * SEGMENT_LENGTH * SEGMENT_LENGTH / 12.0;
const VISCOSITY: f64 = 0.1;
/// Drag across a segment relative to drag along it.
const NORMAL_DRAG_RATIO: f64 = 5.0;
const JOINT_LIMIT: f64 = 1.5;
const DT: f64 = 0.01; // 100 Hz physics
const FRAME_SKIP: usize = 4; // 25 Hz control
const MAX_STEPS: usize = 1000;
const CTRL_COST_WEIGHT: f64 = 1e-4;
const INIT_NOISE: f64 = 0.1;

pub(crate) fn config() -> EnvConfig {
    EnvConfig {
        name: SWIMMER.to_string(),
        obs_dim: 8,
        action_dim: JOINTS,
        max_steps: MAX_STEPS,
    }
}

// ─── Environment ──────────────────────────────────────────────────────

pub struct Swimmer {
    config: EnvConfig,
    pos: [f64; 2],
    vel: [f64; 2],
    body_angle: f64,
    body_omega: f64,
    joint_angle: [f64; JOINTS],
    joint_omega: [f64; JOINTS],
    step_count: usize,
    rng: StdRng,
    view: TextView,
}

impl Swimmer {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let mut env = Swimmer {
            config: config(),
            pos: [0.0; 2],
            vel: [0.0; 2],
            body_angle: 0.0,
            body_omega: 0.0,
            joint_angle: [0.0; JOINTS],
            joint_omega: [0.0; JOINTS],
            step_count: 0,
            rng,
            view: TextView::default(),
        };
        env.reset(None);
        env
    }

    fn observation(&self) -> Vec<f64> {
        vec![
            self.body_angle,
            self.joint_angle[0],
            self.joint_angle[1],
            self.vel[0],
            self.vel[1],
            self.body_omega,
            self.joint_omega[0],
            self.joint_omega[1],
        ]
    }

    /// Absolute orientation of each segment.
    fn segment_angles(&self) -> [f64; SEGMENTS] {
        let mut angles = [self.body_angle; SEGMENTS];
        for i in 0..JOINTS {
            angles[i + 1] = angles[i] + self.joint_angle[i];
        }
        angles
    }

    /// Segment centres relative to the centre of mass.
    fn segment_offsets(angles: &[f64; SEGMENTS]) -> [[f64; 2]; SEGMENTS] {
        let half = 0.5 * SEGMENT_LENGTH;
        let mut centres = [[0.0; 2]; SEGMENTS];
        let mut joint = [0.0f64; 2];
        for (c, a) in centres.iter_mut().zip(angles) {
            let (sin, cos) = a.sin_cos();
            *c = [joint[0] + half * cos, joint[1] + half * sin];
            joint = [joint[0] + SEGMENT_LENGTH * cos, joint[1] + SEGMENT_LENGTH * sin];
        }
        let n = SEGMENTS as f64;
        let com = [
            centres.iter().map(|c| c[0]).sum::<f64>() / n,
            centres.iter().map(|c| c[1]).sum::<f64>() / n,
        ];
        centres.map(|c| [c[0] - com[0], c[1] - com[1]])
    }

    fn integrate(&mut self, torque: &[f64; JOINTS]) {
        let angles = self.segment_angles();
        let offsets = Self::segment_offsets(&angles);

        let mut force = [0.0f64; 2];
        let mut drag_torque = 0.0;
        let mut omega = self.body_omega;

        for i in 0..SEGMENTS {
            if i > 0 {
                omega += self.joint_omega[i - 1];
            }
            let r = offsets[i];
            // Translation plus rotation about the centre of mass.
            let v = [self.vel[0] - omega * r[1], self.vel[1] + omega * r[0]];

            let (sin, cos) = angles[i].sin_cos();
            let along = v[0] * cos + v[1] * sin;
            let across = -v[0] * sin + v[1] * cos;
            let f_along = -VISCOSITY * along * SEGMENT_LENGTH;
            let f_across = -VISCOSITY * NORMAL_DRAG_RATIO * across * SEGMENT_LENGTH;
            let f = [f_along * cos - f_across * sin, f_along * sin + f_across * cos];

            force[0] += f[0];
            force[1] += f[1];
            drag_torque += r[0] * f[1] - r[1] * f[0];
            drag_torque -= 2.0 * VISCOSITY * omega * SEGMENT_LENGTH * SEGMENT_LENGTH;
        }

        let mass = SEGMENT_MASS * SEGMENTS as f64;
        let inertia = SEGMENT_INERTIA * SEGMENTS as f64;
        // Joint torques react on the body.
        let body_alpha = (drag_torque - torque.iter().sum::<f64>()) / inertia;

        for k in 0..2 {
            self.vel[k] += force[k] / mass * DT;
            self.pos[k] += self.vel[k] * DT;
        }
        self.body_omega += body_alpha * DT;
        self.body_angle += self.body_omega * DT;

        for j in 0..JOINTS {
            let joint_drag = -VISCOSITY * self.joint_omega[j] * SEGMENT_LENGTH;
            self.joint_omega[j] += (torque[j] + joint_drag) / SEGMENT_INERTIA * DT;
            let angle = self.joint_angle[j] + self.joint_omega[j] * DT;
            if angle.abs() > JOINT_LIMIT {
                // Hit the stop.
                self.joint_omega[j] = 0.0;
            }
            self.joint_angle[j] = angle.clamp(-JOINT_LIMIT, JOINT_LIMIT);
        }
    }
}

impl Environment for Swimmer {
    fn reset(&mut self, seed: Option<u64>) -> Vec<f64> {
        if let Some(s) = seed {
            self.rng = StdRng::seed_from_u64(s);
        }
        self.pos = [0.0; 2];
        self.vel = [0.0; 2];
        self.body_angle = self.rng.gen_range(-INIT_NOISE..INIT_NOISE);
        self.body_omega = 0.0;
        for a in &mut self.joint_angle {
            *a = self.rng.gen_range(-INIT_NOISE..INIT_NOISE);
        }
        self.joint_omega = [0.0; JOINTS];
        self.step_count = 0;
        self.observation()
    }

    fn step(&mut self, action: &[f64]) -> Result<StepResult, EnvError> {
        check_action(&self.config, action)?;
        let mut torque = [0.0; JOINTS];
        for (t, a) in torque.iter_mut().zip(action) {
            *t = a.clamp(-1.0, 1.0);
        }

        let x_before = self.pos[0];
        for _ in 0..FRAME_SKIP {
            self.integrate(&torque);
        }
        let forward = (self.pos[0] - x_before) / (DT * FRAME_SKIP as f64);
        let ctrl_cost = CTRL_COST_WEIGHT * torque.iter().map(|t| t * t).sum::<f64>();

        self.step_count += 1;
        let mut result = StepResult {
            observation: self.observation(),
            reward: forward - ctrl_cost,
            terminated: false,
            truncated: self.step_count >= MAX_STEPS,
            ..Default::default()
        };
        result.info.insert("x_position", self.pos[0]);
        result.info.insert("forward_reward", forward);
        result.info.insert("ctrl_cost", ctrl_cost);
        Ok(result)
    }

    fn render(&mut self) {
        let picture = format!(
            "{} heading {:+.2}",
            strip(self.pos[0], -1.0, 1.0, 41, '~'),
            self.body_angle
        );
        self.view.frame(&self.config.name, self.step_count, self.pos[0], &picture);
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
