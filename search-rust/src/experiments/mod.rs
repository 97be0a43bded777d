//! Finite-difference policy search in pure Rust.
//!
//! Architecture:
//! - `env`: Environment trait, registry and factory
//! - `swimmer`, `pendulum`: built-in continuous-control environments
//! - `normalize`: per-observation standardization
//! - `policy`: weight matrix and linear policy
//! - `rollout`: single-episode evaluation
//! - `optim`: the perturb / evaluate / accept loop

pub mod env;
pub mod error;
pub mod normalize;
pub mod optim;
pub mod pendulum;
pub mod policy;
pub mod rollout;
pub mod swimmer;
