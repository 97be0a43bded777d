//! Error types shared by the experiment modules.

use thiserror::Error;

/// Failure to standardize an observation vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("need at least 2 values to normalize, got {len}")]
    TooShort { len: usize },
    #[error("observation has zero variance")]
    ZeroVariance,
    #[error("observation statistics are not finite")]
    NonFinite,
}

/// Failure reported by an environment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    #[error("{env}: action has {got} components, expected {expected}")]
    ActionShape {
        env: String,
        expected: usize,
        got: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),
    #[error("{len} values cannot fill a {rows}x{cols} matrix")]
    MatrixData {
        rows: usize,
        cols: usize,
        len: usize,
    },
    #[error("weights are {rows}x{cols} but observation has {obs_len} values")]
    WeightShape {
        rows: usize,
        cols: usize,
        obs_len: usize,
    },
}
