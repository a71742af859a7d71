//! Axis configuration handed to renderers
//!
//! Tick placement and label formatting belong to the rendering backend;
//! an axis here only carries its scale, its data limits and its label.

use cytoview_stats::{BinEdges, Scale};
use serde::{Deserialize, Serialize};

use crate::error::{CytoviewError, CytoviewResult};

/// Scale, limits and caption of one panel axis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub scale: Scale,
    /// Lower data limit
    pub min: f64,
    /// Upper data limit
    pub max: f64,
    /// Caption, usually the channel name
    pub label: Option<String>,
    /// Unit shown after the caption (e.g. "a.u.", "MEF")
    pub unit: Option<String>,
}

impl AxisConfig {
    pub fn new(scale: Scale, min: f64, max: f64) -> Self {
        Self {
            scale,
            min,
            max,
            label: None,
            unit: None,
        }
    }

    /// Axis spanning a set of bin edges, on the edges' scale
    pub fn from_edges(edges: &BinEdges) -> Self {
        Self::new(edges.scale(), edges.first(), edges.last())
    }

    pub fn with_label(self, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..self
        }
    }

    pub fn with_unit(self, unit: impl Into<String>) -> Self {
        Self {
            unit: Some(unit.into()),
            ..self
        }
    }

    /// Override the data limits
    ///
    /// Limits must be increasing, and positive on a log axis.
    pub fn with_limits(mut self, min: f64, max: f64) -> CytoviewResult<Self> {
        check_limits(self.scale, min, max)?;
        self.min = min;
        self.max = max;
        Ok(self)
    }

    /// Caption and unit combined as `label [unit]`
    pub fn full_label(&self) -> Option<String> {
        let unit = self.unit.as_deref().map(|u| format!("[{}]", u));
        match (self.label.as_deref(), unit) {
            (Some(label), Some(unit)) => Some(format!("{} {}", label, unit)),
            (label, unit) => label.map(str::to_owned).or(unit),
        }
    }

    /// Position of `value` along the axis, 0.0 at `min` and 1.0 at `max`
    pub fn normalize(&self, value: f64) -> f64 {
        match self.scale {
            Scale::Linear => (value - self.min) / (self.max - self.min),
            Scale::Log => (value.log10() - self.min.log10()) / (self.max.log10() - self.min.log10()),
        }
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self::new(Scale::Linear, 0.0, 1.0)
    }
}

pub(crate) fn check_limits(scale: Scale, min: f64, max: f64) -> CytoviewResult<()> {
    if !min.is_finite() || !max.is_finite() || max <= min {
        return Err(CytoviewError::InvalidRange(format!(
            "axis limits ({}, {}) must be finite and increasing",
            min, max
        )));
    }
    if scale == Scale::Log && min <= 0.0 {
        return Err(CytoviewError::InvalidRange(format!(
            "log axis limits must be positive, got lower limit {}",
            min
        )));
    }
    Ok(())
}
