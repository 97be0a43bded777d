//! Random search over linear control policies.
//!
//! A policy maps a standardized observation to an action through a single
//! weight matrix. The search perturbs the matrix in both directions, steps
//! along the reward difference, and keeps the step when it pays off.

pub mod config;
pub mod experiments;

pub use config::SearchConfig;
pub use experiments::env::{make, Environment};
pub use experiments::error::SearchError;
pub use experiments::optim::{FiniteDifferenceSearch, RunSummary, UpdateEvent};
