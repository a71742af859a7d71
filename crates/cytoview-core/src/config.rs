//! Configuration for cytoview-core
//!
//! Figure-wide defaults for binning, smoothing, styling and layout. Every
//! per-panel parameter set starts from these values and overrides what
//! the caller asks for.

use cytoview_stats::{Scale, SmoothingOptions, DEFAULT_BIN_COUNT, DEFAULT_TRUNCATE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::colormap::{default_palette, get_colormap, Color, DEFAULT_COLORMAP};
use crate::error::{CytoviewError, CytoviewResult};

/// Figure-wide plotting configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Bin counts and axis scales
    pub binning: BinningConfig,
    /// Gaussian smoothing of density grids
    pub smoothing: SmoothingConfig,
    /// Colors and histogram appearance
    pub style: StyleConfig,
    /// Panel geometry
    pub layout: LayoutConfig,
}

/// Binning defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinningConfig {
    /// Bins per axis
    pub bins: usize,
    /// Scale of histogram x axes and density x axes
    pub x_scale: Scale,
    /// Scale of density y axes
    pub y_scale: Scale,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BIN_COUNT,
            x_scale: Scale::Linear,
            y_scale: Scale::Linear,
        }
    }
}

/// Smoothing defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub enabled: bool,
    /// Sigma in bins; unset derives it from the grid resolution
    pub sigma: Option<f64>,
    /// Kernel half-width in units of sigma
    pub truncate: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sigma: None,
            truncate: DEFAULT_TRUNCATE,
        }
    }
}

impl SmoothingConfig {
    pub fn options(&self) -> SmoothingOptions {
        SmoothingOptions {
            enabled: self.enabled,
            sigma: self.sigma,
            truncate: self.truncate,
        }
    }
}

/// How a 1D histogram is drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistType {
    /// Filled rectangles per bin
    Bar,
    /// Outline only
    Step,
    /// Outline with the area underneath filled
    #[default]
    StepFilled,
}

impl HistType {
    pub fn name(&self) -> &'static str {
        match self {
            HistType::Bar => "bar",
            HistType::Step => "step",
            HistType::StepFilled => "stepfilled",
        }
    }

    /// Whether the area under the outline is filled
    pub fn is_filled(&self) -> bool {
        !matches!(self, HistType::Step)
    }
}

impl FromStr for HistType {
    type Err = CytoviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bar" => Ok(HistType::Bar),
            "step" => Ok(HistType::Step),
            "stepfilled" => Ok(HistType::StepFilled),
            _ => Err(CytoviewError::InvalidMode {
                mode: s.to_string(),
                context: "histogram type".to_string(),
            }),
        }
    }
}

impl fmt::Display for HistType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Styling defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Color ramp for density panels
    pub colormap: String,
    pub hist_type: HistType,
    /// Opacity of histogram faces
    pub alpha: f32,
    /// Face colors cycled across overlaid datasets (hex)
    pub overlay_colors: Vec<String>,
    /// Outline color for filled histograms (hex); unset uses the face color
    pub edge_color: Option<String>,
    /// Leave zero-density cells undrawn in mesh panels
    pub mask_empty_cells: bool,
    /// Draw a colorbar next to density panels
    pub colorbar: bool,
    /// Marker size for scatter panels, in points
    pub marker_size: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            colormap: DEFAULT_COLORMAP.to_string(),
            hist_type: HistType::default(),
            alpha: 1.0,
            overlay_colors: default_palette(),
            edge_color: None,
            mask_empty_cells: true,
            colorbar: false,
            marker_size: 2.0,
        }
    }
}

/// Panel geometry, in points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub panel_width: f32,
    pub panel_height: f32,
    /// Widest grid the automatic layout will produce
    pub max_columns: usize,
    /// Space between panels as a fraction of a panel
    pub spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            panel_width: 480.0,
            panel_height: 360.0,
            max_columns: 3,
            spacing: 0.1,
        }
    }
}

impl PlotConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    #[cfg(feature = "toml-config")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize configuration to TOML
    #[cfg(feature = "toml-config")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Validate configuration values
    pub fn validate(&self) -> CytoviewResult<()> {
        if self.binning.bins == 0 {
            return Err(CytoviewError::InvalidConfig(
                "binning.bins must be positive".to_string(),
            ));
        }

        if let Some(sigma) = self.smoothing.sigma {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(CytoviewError::InvalidConfig(format!(
                    "smoothing.sigma must be a non-negative number, got {}",
                    sigma
                )));
            }
        }

        if !self.smoothing.truncate.is_finite() || self.smoothing.truncate <= 0.0 {
            return Err(CytoviewError::InvalidConfig(
                "smoothing.truncate must be positive".to_string(),
            ));
        }

        if get_colormap(&self.style.colormap).is_none() {
            return Err(CytoviewError::InvalidConfig(format!(
                "unknown colormap '{}'",
                self.style.colormap
            )));
        }

        if !(0.0..=1.0).contains(&self.style.alpha) {
            return Err(CytoviewError::InvalidConfig(
                "style.alpha must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.style.overlay_colors.is_empty() {
            return Err(CytoviewError::InvalidConfig(
                "style.overlay_colors must not be empty".to_string(),
            ));
        }

        let colors = self.style.overlay_colors.iter().chain(&self.style.edge_color);
        for color in colors {
            if Color::from_hex(color).is_none() {
                return Err(CytoviewError::InvalidConfig(format!(
                    "'{}' is not a hex color",
                    color
                )));
            }
        }

        if self.layout.max_columns == 0 {
            return Err(CytoviewError::InvalidConfig(
                "layout.max_columns must be positive".to_string(),
            ));
        }

        if self.layout.panel_width <= 0.0 || self.layout.panel_height <= 0.0 {
            return Err(CytoviewError::InvalidConfig(
                "panel dimensions must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
