//! Error types for cytoview-core
//!
//! Every failure is reported before any drawing happens:
//! - Invalid or degenerate value ranges (including bad bin edges and sigma)
//! - Paired channel arrays of unequal length
//! - Unknown channels
//! - Rendering modes that do not fit the panel's data

use cytoview_io::IoError;
use cytoview_stats::StatsError;
use thiserror::Error;

/// Main error type for cytoview operations
#[derive(Error, Debug)]
pub enum CytoviewError {
    /// Degenerate range, non-positive range under a log scale, or bad edges
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Paired channel arrays differ in length
    #[error("Dimension mismatch: {x} x readings vs {y} y readings")]
    DimensionMismatch { x: usize, y: usize },

    /// Channel name or index not present in the table
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// Rendering mode not supported for the panel
    #[error("Invalid mode '{mode}' for {context}")]
    InvalidMode { mode: String, context: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Event source errors
    #[error("I/O error: {0}")]
    Io(IoError),
}

impl From<StatsError> for CytoviewError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::DimensionMismatch { x, y } => CytoviewError::DimensionMismatch { x, y },
            StatsError::UnknownScale(scale) => CytoviewError::InvalidMode {
                mode: scale,
                context: "axis scale".to_string(),
            },
            other @ (StatsError::InvalidRange { .. }
            | StatsError::InvalidEdges(_)
            | StatsError::InvalidSigma(_)) => CytoviewError::InvalidRange(other.to_string()),
        }
    }
}

impl From<IoError> for CytoviewError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::UnknownChannel(channel) => CytoviewError::UnknownChannel(channel),
            other => CytoviewError::Io(other),
        }
    }
}

/// Result type alias for cytoview operations
pub type CytoviewResult<T> = Result<T, CytoviewError>;
