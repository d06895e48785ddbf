//! Risk-subsystem error type.

use thiserror::Error;

use sr_core::CoreError;

/// Errors produced by `sr-risk`.
///
/// Scoring itself is infallible; these only arise from invalid
/// configuration, bounding boxes or unreadable dataset files.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("invalid bounding box: {0}")]
    InvalidBounds(String),

    #[error("dataset parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RiskResult<T> = Result<T, RiskError>;
