//! Panel descriptions
//!
//! A [`PlotSpec`] describes one panel of a figure: the computed result to
//! show, how to render it, and its labels, limits and style. Specs are
//! built per call and consumed by the composer.

use cytoview_stats::{DensitySource, Histogram1D, Histogram2D};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::axis::check_limits;
use crate::colormap::Color;
use crate::config::{HistType, StyleConfig};
use crate::error::{CytoviewError, CytoviewResult};
use crate::layout::PanelKind;

/// How a panel's data is drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// 1D: one rectangle per bin
    Bar,
    /// 1D: stepped outline over the bins
    Line,
    /// 2D: density grid as a colored surface
    Mesh,
    /// 2D: one point per event colored by its local density
    Scatter,
}

impl RenderMode {
    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::Bar => "bar",
            RenderMode::Line => "line",
            RenderMode::Mesh => "mesh",
            RenderMode::Scatter => "scatter",
        }
    }

    /// Whether the mode draws 1D histograms
    pub fn is_1d(&self) -> bool {
        matches!(self, RenderMode::Bar | RenderMode::Line)
    }

    /// Whether the mode draws 2D densities
    pub fn is_2d(&self) -> bool {
        !self.is_1d()
    }

    /// Mode and fill flag that draw a histogram of type `hist_type`
    pub fn for_hist_type(hist_type: HistType) -> Self {
        match hist_type {
            HistType::Bar => RenderMode::Bar,
            HistType::Step | HistType::StepFilled => RenderMode::Line,
        }
    }
}

impl FromStr for RenderMode {
    type Err = CytoviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bar" => Ok(RenderMode::Bar),
            "line" | "step" => Ok(RenderMode::Line),
            "mesh" => Ok(RenderMode::Mesh),
            "scatter" => Ok(RenderMode::Scatter),
            _ => Err(CytoviewError::InvalidMode {
                mode: s.to_string(),
                context: "render mode".to_string(),
            }),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A 2D histogram together with the readings it was computed from
///
/// Scatter rendering needs each event's position as well as its cell, so
/// the paired readings travel with the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Density2D {
    histogram: Histogram2D,
    x: Vec<f64>,
    y: Vec<f64>,
    x_channel: String,
    y_channel: String,
}

impl Density2D {
    /// Pair a histogram with its readings
    pub fn new(
        histogram: Histogram2D,
        x: Vec<f64>,
        y: Vec<f64>,
        x_channel: impl Into<String>,
        y_channel: impl Into<String>,
    ) -> CytoviewResult<Self> {
        if x.len() != y.len() {
            return Err(CytoviewError::DimensionMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        if x.len() != histogram.cells().len() {
            return Err(CytoviewError::DimensionMismatch {
                x: x.len(),
                y: histogram.cells().len(),
            });
        }

        Ok(Self {
            histogram,
            x,
            y,
            x_channel: x_channel.into(),
            y_channel: y_channel.into(),
        })
    }

    pub fn histogram(&self) -> &Histogram2D {
        &self.histogram
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn x_channel(&self) -> &str {
        &self.x_channel
    }

    pub fn y_channel(&self) -> &str {
        &self.y_channel
    }

    /// `(x, y, density)` of every included event, least dense first
    ///
    /// Drawing in this order leaves the densest events on top. Events of
    /// equal density keep their input order.
    pub fn scatter_points(&self, source: DensitySource) -> Vec<(f64, f64, f64)> {
        let mut points: Vec<(f64, f64, f64)> = self
            .histogram
            .event_densities(source)
            .into_iter()
            .enumerate()
            .filter_map(|(k, density)| density.map(|d| (self.x[k], self.y[k], d)))
            .collect();
        points.sort_by(|a, b| a.2.total_cmp(&b.2));
        points
    }
}

/// Data shown by a panel
#[derive(Debug, Clone, PartialEq)]
pub enum PanelData {
    /// One or more histograms over shared edges, overlaid
    Histogram {
        histograms: Vec<Histogram1D>,
        channel: String,
    },
    /// A density map of a channel pair
    Density(Density2D),
}

impl PanelData {
    /// Layout category of this panel
    pub fn kind(&self) -> PanelKind {
        match self {
            PanelData::Histogram { .. } => PanelKind::Histogram,
            PanelData::Density(_) => PanelKind::Density,
        }
    }
}

/// Per-panel styling; unset fields fall back to the figure's [`StyleConfig`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelStyle {
    /// Face opacity
    pub alpha: Option<f32>,
    /// Face colors cycled across overlaid datasets (hex)
    pub colors: Option<Vec<String>>,
    /// Outline color (hex)
    pub edge_color: Option<String>,
    /// Fill the area under a line histogram
    pub filled: Option<bool>,
    /// Legend label per overlaid dataset
    pub labels: Vec<String>,
    /// Color ramp for density panels
    pub colormap: Option<String>,
    pub colorbar: Option<bool>,
    /// Leave zero cells undrawn in mesh panels
    pub mask_empty: Option<bool>,
    /// Draw the density grid as a probability mass function
    pub normed: bool,
    /// Rescale histogram heights so the tallest bin is 1
    pub normed_height: bool,
    /// Grid that scatter points look their density up in
    pub density_source: DensitySource,
}

impl PanelStyle {
    pub fn alpha(&self, defaults: &StyleConfig) -> f32 {
        self.alpha.unwrap_or(defaults.alpha)
    }

    pub fn colormap<'a>(&'a self, defaults: &'a StyleConfig) -> &'a str {
        self.colormap.as_deref().unwrap_or(&defaults.colormap)
    }

    pub fn colorbar(&self, defaults: &StyleConfig) -> bool {
        self.colorbar.unwrap_or(defaults.colorbar)
    }

    pub fn mask_empty(&self, defaults: &StyleConfig) -> bool {
        self.mask_empty.unwrap_or(defaults.mask_empty_cells)
    }

    pub fn filled(&self, defaults: &StyleConfig) -> bool {
        self.filled.unwrap_or(defaults.hist_type.is_filled())
    }

    /// Face color of overlay dataset `index`
    pub fn face_color(&self, index: usize, defaults: &StyleConfig) -> CytoviewResult<Color> {
        let palette = self.colors.as_ref().unwrap_or(&defaults.overlay_colors);
        if palette.is_empty() {
            return Err(CytoviewError::InvalidConfig(
                "panel color list is empty".to_string(),
            ));
        }
        parse_color(&palette[index % palette.len()])
    }

    /// Outline color; `None` uses the face color
    pub fn edge_color(&self, defaults: &StyleConfig) -> CytoviewResult<Option<Color>> {
        self.edge_color
            .as_ref()
            .or(defaults.edge_color.as_ref())
            .map(|hex| parse_color(hex))
            .transpose()
    }
}

fn parse_color(hex: &str) -> CytoviewResult<Color> {
    Color::from_hex(hex)
        .ok_or_else(|| CytoviewError::InvalidConfig(format!("'{}' is not a hex color", hex)))
}

/// One panel of a figure
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    pub data: PanelData,
    pub mode: RenderMode,
    /// Axis label overrides; unset labels come from the channel names
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub title: Option<String>,
    pub x_limits: Option<(f64, f64)>,
    pub y_limits: Option<(f64, f64)>,
    pub style: PanelStyle,
}

impl PlotSpec {
    /// Histogram panel, drawn as a filled step outline
    pub fn histogram(histograms: Vec<Histogram1D>, channel: impl Into<String>) -> Self {
        Self::with_data(
            PanelData::Histogram {
                histograms,
                channel: channel.into(),
            },
            RenderMode::Line,
        )
    }

    /// Density panel, drawn as a mesh
    pub fn density(density: Density2D) -> Self {
        Self::with_data(PanelData::Density(density), RenderMode::Mesh)
    }

    fn with_data(data: PanelData, mode: RenderMode) -> Self {
        Self {
            data,
            mode,
            x_label: None,
            y_label: None,
            title: None,
            x_limits: None,
            y_limits: None,
            style: PanelStyle::default(),
        }
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the mode from its name
    pub fn with_mode_str(self, mode: &str) -> CytoviewResult<Self> {
        Ok(self.with_mode(mode.parse()?))
    }

    pub fn with_x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = Some(label.into());
        self
    }

    pub fn with_y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = Some(label.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_x_limits(mut self, min: f64, max: f64) -> Self {
        self.x_limits = Some((min, max));
        self
    }

    pub fn with_y_limits(mut self, min: f64, max: f64) -> Self {
        self.y_limits = Some((min, max));
        self
    }

    pub fn with_style(mut self, style: PanelStyle) -> Self {
        self.style = style;
        self
    }

    /// Check that the mode fits the data and the panel options are usable
    pub fn validate(&self) -> CytoviewResult<()> {
        match &self.data {
            PanelData::Histogram { histograms, .. } => {
                if !self.mode.is_1d() {
                    return Err(invalid_mode(self.mode, "histogram panel"));
                }
                if histograms.is_empty() {
                    return Err(CytoviewError::InvalidConfig(
                        "histogram panel has no datasets".to_string(),
                    ));
                }
                let edges = histograms[0].edges();
                if histograms.iter().any(|h| h.edges() != edges) {
                    return Err(CytoviewError::InvalidConfig(
                        "overlaid histograms must share bin edges".to_string(),
                    ));
                }
                if let Some((min, max)) = self.x_limits {
                    check_limits(edges.scale(), min, max)?;
                }
                if let Some((min, max)) = self.y_limits {
                    check_limits(cytoview_stats::Scale::Linear, min, max)?;
                }
            }
            PanelData::Density(density) => {
                if !self.mode.is_2d() {
                    return Err(invalid_mode(self.mode, "density panel"));
                }
                let hist = density.histogram();
                if let Some((min, max)) = self.x_limits {
                    check_limits(hist.edges_x().scale(), min, max)?;
                }
                if let Some((min, max)) = self.y_limits {
                    check_limits(hist.edges_y().scale(), min, max)?;
                }
            }
        }

        if let Some(alpha) = self.style.alpha {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(CytoviewError::InvalidConfig(format!(
                    "alpha must be between 0.0 and 1.0, got {}",
                    alpha
                )));
            }
        }

        Ok(())
    }
}

fn invalid_mode(mode: RenderMode, context: &str) -> CytoviewError {
    CytoviewError::InvalidMode {
        mode: mode.name().to_string(),
        context: context.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cytoview_stats::{BinEdges, Scale, SmoothingOptions};
    use std::sync::Arc;

    fn density(xs: Vec<f64>, ys: Vec<f64>) -> Density2D {
        let edges = Arc::new(BinEdges::generate(Scale::Linear, 2, 0.0, 1.0).unwrap());
        let hist = Histogram2D::compute(
            &xs,
            &ys,
            Arc::clone(&edges),
            edges,
            &SmoothingOptions::disabled(),
        )
        .unwrap();
        Density2D::new(hist, xs, ys, "FSC-H", "SSC-H").unwrap()
    }

    #[test]
    fn test_render_mode_parse() {
        assert_eq!("mesh".parse::<RenderMode>().unwrap(), RenderMode::Mesh);
        assert_eq!("Scatter".parse::<RenderMode>().unwrap(), RenderMode::Scatter);
        assert_eq!("step".parse::<RenderMode>().unwrap(), RenderMode::Line);
        let err = "contour".parse::<RenderMode>().unwrap_err();
        assert!(matches!(err, CytoviewError::InvalidMode { ref mode, .. } if mode == "contour"));
    }

    #[test]
    fn test_mode_for_hist_type() {
        assert_eq!(RenderMode::for_hist_type(HistType::Bar), RenderMode::Bar);
        assert_eq!(RenderMode::for_hist_type(HistType::StepFilled), RenderMode::Line);
    }

    #[test]
    fn test_scatter_points_sorted_ascending() {
        let d = density(vec![0.9, 0.1, 0.1, 0.1, 5.0], vec![0.9, 0.1, 0.1, 0.1, 0.5]);
        let points = d.scatter_points(DensitySource::Raw);

        // The out-of-range event is left out
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], (0.9, 0.9, 1.0));
        assert!(points[1..].iter().all(|p| p.2 == 3.0));
    }

    #[test]
    fn test_density_length_checked() {
        let d = density(vec![0.1], vec![0.1]);
        let hist = d.histogram().clone();
        let result = Density2D::new(hist, vec![0.1, 0.2], vec![0.1, 0.2], "a", "b");
        assert!(matches!(result, Err(CytoviewError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_validate_mode_against_data() {
        let spec = PlotSpec::density(density(vec![0.5], vec![0.5]));
        assert!(spec.validate().is_ok());

        let spec = spec.with_mode(RenderMode::Bar);
        assert!(matches!(spec.validate(), Err(CytoviewError::InvalidMode { .. })));

        let edges = Arc::new(BinEdges::generate(Scale::Linear, 4, 0.0, 1.0).unwrap());
        let hist = Histogram1D::compute(&[0.5], edges, false);
        let spec = PlotSpec::histogram(vec![hist], "FL1-H").with_mode(RenderMode::Scatter);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_validate_limits_on_log_axis() {
        let edges = Arc::new(BinEdges::generate(Scale::Log, 4, 1.0, 1e4).unwrap());
        let hist = Histogram1D::compute(&[10.0], edges, false);
        let spec = PlotSpec::histogram(vec![hist], "FL1-H").with_x_limits(-1.0, 100.0);
        assert!(matches!(spec.validate(), Err(CytoviewError::InvalidRange(_))));
    }

    #[test]
    fn test_empty_histogram_panel_rejected() {
        let spec = PlotSpec::histogram(vec![], "FL1-H");
        assert!(matches!(spec.validate(), Err(CytoviewError::InvalidConfig(_))));
    }

    #[test]
    fn test_panel_style_falls_back_to_config() {
        let defaults = StyleConfig::default();
        let style = PanelStyle::default();
        assert_eq!(style.alpha(&defaults), 1.0);
        assert_eq!(style.colormap(&defaults), "density");
        assert!(style.filled(&defaults));

        let first = style.face_color(0, &defaults).unwrap();
        let wrapped = style.face_color(defaults.overlay_colors.len(), &defaults).unwrap();
        assert_eq!(first, wrapped);

        let style = PanelStyle {
            colors: Some(vec!["#000000".to_string()]),
            edge_color: Some("#FFFFFF".to_string()),
            ..PanelStyle::default()
        };
        assert_eq!(style.face_color(3, &defaults).unwrap(), Color::rgb(0.0, 0.0, 0.0));
        assert_eq!(style.edge_color(&defaults).unwrap(), Some(Color::rgb(1.0, 1.0, 1.0)));
    }
}
