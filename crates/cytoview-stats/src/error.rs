//! Error types for cytoview-stats

use thiserror::Error;

/// Errors raised while building bins or counting events
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// Degenerate, non-finite or non-positive (log scale) value range
    #[error("Invalid range [{min}, {max}]: {reason}")]
    InvalidRange { min: f64, max: f64, reason: String },

    /// Caller-supplied bin edges failed validation
    #[error("Invalid bin edges: {0}")]
    InvalidEdges(String),

    /// Paired channel arrays of unequal length
    #[error("Dimension mismatch: x has {x} events, y has {y}")]
    DimensionMismatch { x: usize, y: usize },

    /// Smoothing width that is negative or not finite
    #[error("Invalid smoothing sigma: {0}")]
    InvalidSigma(f64),

    /// Scale name other than "linear" or "log"
    #[error("Unknown scale: {0}")]
    UnknownScale(String),
}

/// Result type alias for binning operations
pub type StatsResult<T> = Result<T, StatsError>;

impl StatsError {
    pub(crate) fn range(min: f64, max: f64, reason: impl Into<String>) -> Self {
        StatsError::InvalidRange {
            min,
            max,
            reason: reason.into(),
        }
    }
}
