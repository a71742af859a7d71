//! Value range of a channel
//!
//! Bins need a lower and upper bound. A channel's declared detector range
//! wins when known; otherwise the bounds come from the finite readings.

use serde::{Deserialize, Serialize};

use crate::edges::Scale;
use crate::error::{StatsError, StatsResult};

/// Finite extent of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataRange {
    /// Number of finite values
    pub count: usize,
    /// Number of NaN/infinite values
    pub missing: usize,
    /// Minimum finite value
    pub min: f64,
    /// Maximum finite value
    pub max: f64,
    /// Smallest strictly positive finite value, if any
    pub min_positive: Option<f64>,
}

impl DataRange {
    /// Scan the data; `None` when there is no finite value at all
    pub fn from_data(data: &[f64]) -> Option<Self> {
        let mut count = 0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut min_positive: Option<f64> = None;

        for &x in data.iter().filter(|x| x.is_finite()) {
            count += 1;
            min = min.min(x);
            max = max.max(x);
            if x > 0.0 {
                min_positive = Some(min_positive.map_or(x, |m| m.min(x)));
            }
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            count,
            missing: data.len() - count,
            min,
            max,
            min_positive,
        })
    }

    /// Get the range (max - min)
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Pick the binning bounds for a channel
///
/// A declared range is used verbatim. Without one, the finite data
/// extent is used; under a log scale the lower bound becomes the smallest
/// strictly positive reading.
pub fn channel_bounds(
    data: &[f64],
    declared: Option<(f64, f64)>,
    scale: Scale,
) -> StatsResult<(f64, f64)> {
    if let Some(bounds) = declared {
        return Ok(bounds);
    }

    let range = DataRange::from_data(data)
        .ok_or_else(|| StatsError::range(f64::NAN, f64::NAN, "channel has no finite values"))?;

    match scale {
        Scale::Linear => Ok((range.min, range.max)),
        Scale::Log => {
            let min = range.min_positive.ok_or_else(|| {
                StatsError::range(
                    range.min,
                    range.max,
                    "log scale requires at least one positive value",
                )
            })?;
            Ok((min, range.max))
        }
    }
}
