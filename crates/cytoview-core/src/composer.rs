//! Multi-panel figure composition
//!
//! [`PlotComposer`] collects panel specs and resolves the layout once, at
//! [`PlotComposer::compose`]. Every panel is validated and turned into
//! draw primitives before the first renderer call, so a bad panel leaves
//! the figure untouched.

use cytoview_stats::{DensitySource, Histogram1D, Scale};

use crate::axis::AxisConfig;
use crate::colormap::{get_colormap, ColormapConfig};
use crate::config::PlotConfig;
use crate::error::{CytoviewError, CytoviewResult};
use crate::figure::{AxesId, Figure};
use crate::layout::{Layout, PanelKind, PanelRegion};
use crate::plot::{Density2D, PanelData, PanelStyle, PlotSpec, RenderMode};
use crate::render::{AxesSpec, DrawPrimitive, Renderer};

/// Builder for a figure made of several panels
#[derive(Debug, Clone, Default)]
pub struct PlotComposer {
    config: PlotConfig,
    panels: Vec<PlotSpec>,
    layout: Layout,
}

/// A panel ready to hand to the renderer
struct PreparedPanel {
    axes: AxesSpec,
    primitives: Vec<DrawPrimitive>,
}

impl PlotComposer {
    pub fn new(config: PlotConfig) -> Self {
        Self {
            config,
            panels: Vec::new(),
            layout: Layout::Auto,
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Append a panel
    pub fn add_panel(mut self, panel: PlotSpec) -> Self {
        self.panels.push(panel);
        self
    }

    pub fn push_panel(&mut self, panel: PlotSpec) {
        self.panels.push(panel);
    }

    pub fn panels(&self) -> &[PlotSpec] {
        &self.panels
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    /// Draw every panel into `figure`, returning the axes created per panel
    ///
    /// The figure must not hold axes yet: panel regions are laid out on a
    /// grid of their own.
    pub fn compose<R: Renderer>(&self, figure: &mut Figure<R>) -> CytoviewResult<Vec<AxesId>> {
        self.config.validate()?;
        figure.ensure_writable()?;
        if figure.num_axes() > 0 {
            return Err(CytoviewError::InvalidConfig(format!(
                "figure already holds {} axes; compose into a fresh figure",
                figure.num_axes()
            )));
        }

        let kinds: Vec<PanelKind> = self.panels.iter().map(|p| p.data.kind()).collect();
        let (grid, cells) = self.layout.place(&kinds, self.config.layout.max_columns)?;

        let prepared = self
            .panels
            .iter()
            .zip(&cells)
            .map(|(panel, cell)| {
                let region = grid.region(*cell, self.config.layout.spacing);
                self.prepare(panel, region)
            })
            .collect::<CytoviewResult<Vec<_>>>()?;

        tracing::debug!(
            panels = prepared.len(),
            rows = grid.rows,
            cols = grid.cols,
            "composing figure"
        );

        figure.begin(grid)?;
        let mut ids = Vec::with_capacity(prepared.len());
        for panel in prepared {
            let id = figure.add_axes(panel.axes)?;
            for primitive in &panel.primitives {
                figure.draw(primitive)?;
            }
            ids.push(id);
        }
        Ok(ids)
    }

    fn prepare(&self, panel: &PlotSpec, region: PanelRegion) -> CytoviewResult<PreparedPanel> {
        panel.validate()?;
        match &panel.data {
            PanelData::Histogram {
                histograms,
                channel,
            } => self.prepare_histogram(panel, histograms, channel, region),
            PanelData::Density(density) => self.prepare_density(panel, density, region),
        }
    }

    fn prepare_histogram(
        &self,
        panel: &PlotSpec,
        histograms: &[Histogram1D],
        channel: &str,
        region: PanelRegion,
    ) -> CytoviewResult<PreparedPanel> {
        let style = &panel.style;
        let defaults = &self.config.style;
        let alpha = style.alpha(defaults);
        let edge = style.edge_color(defaults)?;
        let edges = histograms[0].edges().as_slice().to_vec();

        let mut primitives = Vec::with_capacity(histograms.len() + 1);
        let mut legend = Vec::new();
        let mut peak: f64 = 0.0;

        for (k, hist) in histograms.iter().enumerate() {
            let heights = if style.normed_height {
                hist.normalized_height()
            } else {
                hist.heights()
            };
            peak = heights.iter().copied().fold(peak, f64::max);

            let face = style.face_color(k, defaults)?.with_alpha(alpha);
            let label = style.labels.get(k).cloned();
            if let Some(label) = &label {
                legend.push((label.clone(), face));
            }

            primitives.push(match panel.mode {
                RenderMode::Bar => DrawPrimitive::Bars {
                    edges: edges.clone(),
                    heights,
                    face,
                    edge,
                    label,
                },
                _ => DrawPrimitive::Steps {
                    edges: edges.clone(),
                    heights,
                    color: face,
                    filled: style.filled(defaults),
                    edge,
                    label,
                },
            });
        }

        if !legend.is_empty() {
            primitives.push(DrawPrimitive::Legend { entries: legend });
        }

        let default_y_label = if style.normed_height {
            "Normalized height"
        } else if histograms[0].density().is_some() {
            "Probability density"
        } else {
            "Events"
        };

        let x_axis = AxisConfig::from_edges(histograms[0].edges())
            .with_label(panel.x_label.as_deref().unwrap_or(channel));
        let y_axis = AxisConfig::new(Scale::Linear, 0.0, if peak > 0.0 { peak } else { 1.0 })
            .with_label(panel.y_label.as_deref().unwrap_or(default_y_label));

        Ok(PreparedPanel {
            axes: self.axes_spec(panel, region, x_axis, y_axis)?,
            primitives,
        })
    }

    fn prepare_density(
        &self,
        panel: &PlotSpec,
        density: &Density2D,
        region: PanelRegion,
    ) -> CytoviewResult<PreparedPanel> {
        let style = &panel.style;
        let defaults = &self.config.style;
        let hist = density.histogram();

        let colormap_name = style.colormap(defaults);
        if get_colormap(colormap_name).is_none() {
            return Err(CytoviewError::InvalidConfig(format!(
                "unknown colormap '{}'",
                colormap_name
            )));
        }
        let alpha = style.alpha(defaults);

        let mut primitives = Vec::with_capacity(2);
        let vmax = match panel.mode {
            RenderMode::Mesh => {
                let values = if style.normed {
                    hist.normalized(DensitySource::Smoothed)
                } else {
                    hist.density_grid()
                };
                let vmax = values.iter().copied().fold(0.0, f64::max);
                primitives.push(DrawPrimitive::Mesh {
                    x_edges: hist.edges_x().as_slice().to_vec(),
                    y_edges: hist.edges_y().as_slice().to_vec(),
                    values,
                    colormap: color_scale(colormap_name, vmax),
                    mask_zero: style.mask_empty(defaults),
                    alpha,
                });
                vmax
            }
            RenderMode::Scatter => {
                let points = density.scatter_points(style.density_source);
                let scale = if style.normed {
                    hist.grid(style.density_source).sum()
                } else {
                    1.0
                };
                let scale = if scale > 0.0 { scale } else { 1.0 };

                let xs = points.iter().map(|p| p.0).collect();
                let ys = points.iter().map(|p| p.1).collect();
                let values: Vec<f64> = points.iter().map(|p| p.2 / scale).collect();
                let vmax = values.iter().copied().fold(0.0, f64::max);
                primitives.push(DrawPrimitive::Scatter {
                    xs,
                    ys,
                    values,
                    colormap: color_scale(colormap_name, vmax),
                    size: defaults.marker_size,
                    alpha,
                });
                vmax
            }
            mode => {
                return Err(CytoviewError::InvalidMode {
                    mode: mode.name().to_string(),
                    context: "density panel".to_string(),
                })
            }
        };

        if style.colorbar(defaults) {
            primitives.push(DrawPrimitive::Colorbar {
                colormap: color_scale(colormap_name, vmax),
                label: Some(colorbar_label(style).to_string()),
            });
        }

        let x_axis = AxisConfig::from_edges(hist.edges_x())
            .with_label(panel.x_label.as_deref().unwrap_or(density.x_channel()));
        let y_axis = AxisConfig::from_edges(hist.edges_y())
            .with_label(panel.y_label.as_deref().unwrap_or(density.y_channel()));

        Ok(PreparedPanel {
            axes: self.axes_spec(panel, region, x_axis, y_axis)?,
            primitives,
        })
    }

    fn axes_spec(
        &self,
        panel: &PlotSpec,
        region: PanelRegion,
        mut x_axis: AxisConfig,
        mut y_axis: AxisConfig,
    ) -> CytoviewResult<AxesSpec> {
        if let Some((min, max)) = panel.x_limits {
            x_axis = x_axis.with_limits(min, max)?;
        }
        if let Some((min, max)) = panel.y_limits {
            y_axis = y_axis.with_limits(min, max)?;
        }
        Ok(AxesSpec {
            region,
            x_axis,
            y_axis,
            title: panel.title.clone(),
        })
    }
}

fn color_scale(name: &str, vmax: f64) -> ColormapConfig {
    ColormapConfig::new(name, 0.0, if vmax > 0.0 { vmax } else { 1.0 })
}

fn colorbar_label(style: &PanelStyle) -> &'static str {
    if style.normed {
        "Probability"
    } else {
        "Events"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::FigureOptions;
    use crate::render::{DrawCommand, RecordingRenderer};
    use cytoview_stats::{BinEdges, Histogram2D, SmoothingOptions};
    use std::sync::Arc;

    fn edges(count: usize, min: f64, max: f64) -> Arc<BinEdges> {
        Arc::new(BinEdges::generate(Scale::Linear, count, min, max).unwrap())
    }

    fn histogram_panel() -> PlotSpec {
        let e = edges(4, 0.0, 4.0);
        let hists = Histogram1D::compute_overlay(&[&[0.5, 1.5, 1.6], &[3.5]], &e, false);
        PlotSpec::histogram(hists, "FL1-H")
    }

    fn density_panel(smoothing: SmoothingOptions) -> PlotSpec {
        let xs = vec![0.1, 0.1, 0.9, 0.4];
        let ys = vec![0.1, 0.1, 0.9, 0.6];
        let hist =
            Histogram2D::compute(&xs, &ys, edges(2, 0.0, 1.0), edges(2, 0.0, 1.0), &smoothing)
                .unwrap();
        PlotSpec::density(Density2D::new(hist, xs, ys, "FSC-H", "SSC-H").unwrap())
    }

    fn figure() -> Figure<RecordingRenderer> {
        Figure::new(RecordingRenderer::new(), FigureOptions::default())
    }

    #[test]
    fn test_histogram_overlay_colors_and_labels() {
        let mut style = PanelStyle::default();
        style.labels = vec!["all".to_string(), "gated".to_string()];
        let composer = PlotComposer::default().add_panel(histogram_panel().with_style(style));

        let mut fig = figure();
        let ids = composer.compose(&mut fig).unwrap();
        assert_eq!(ids, vec![AxesId(0)]);

        let axes = fig.axes(ids[0]).unwrap();
        assert_eq!(axes.x_axis.label.as_deref(), Some("FL1-H"));
        assert_eq!(axes.y_axis.label.as_deref(), Some("Events"));
        assert_eq!(axes.y_axis.max, 2.0);

        let renderer = fig.into_renderer();
        let primitives = renderer.primitives();
        assert_eq!(primitives.len(), 3);
        let colors: Vec<_> = primitives[..2]
            .iter()
            .map(|p| match p {
                DrawPrimitive::Steps { color, filled, .. } => {
                    assert!(*filled);
                    *color
                }
                other => panic!("unexpected primitive {:?}", other.kind()),
            })
            .collect();
        assert_ne!(colors[0], colors[1]);
        assert!(matches!(primitives[2], DrawPrimitive::Legend { entries } if entries.len() == 2));
    }

    #[test]
    fn test_bar_mode_and_label_override() {
        let panel = histogram_panel()
            .with_mode(RenderMode::Bar)
            .with_x_label("GFP")
            .with_y_label("Count");
        let mut fig = figure();
        let ids = PlotComposer::default().add_panel(panel).compose(&mut fig).unwrap();

        let axes = fig.axes(ids[0]).unwrap();
        assert_eq!(axes.x_axis.label.as_deref(), Some("GFP"));
        assert_eq!(axes.y_axis.label.as_deref(), Some("Count"));
        assert!(fig
            .renderer()
            .primitives()
            .iter()
            .all(|p| p.kind() == "bars"));
    }

    #[test]
    fn test_normed_height_axis() {
        let mut style = PanelStyle::default();
        style.normed_height = true;
        let mut fig = figure();
        let ids = PlotComposer::default()
            .add_panel(histogram_panel().with_style(style))
            .compose(&mut fig)
            .unwrap();
        let axes = fig.axes(ids[0]).unwrap();
        assert_eq!(axes.y_axis.max, 1.0);
        assert_eq!(axes.y_axis.label.as_deref(), Some("Normalized height"));
    }

    #[test]
    fn test_mesh_panel_with_colorbar() {
        let mut style = PanelStyle::default();
        style.colorbar = Some(true);
        let panel = density_panel(SmoothingOptions::disabled()).with_style(style);

        let mut fig = figure();
        PlotComposer::default().add_panel(panel).compose(&mut fig).unwrap();
        let renderer = fig.into_renderer();
        let primitives = renderer.primitives();

        match primitives[0] {
            DrawPrimitive::Mesh {
                values,
                colormap,
                mask_zero,
                ..
            } => {
                assert_eq!(values[[0, 0]], 2.0);
                assert_eq!(values[[1, 1]], 1.0);
                assert_eq!(colormap.max_value, 2.0);
                assert!(*mask_zero);
            }
            other => panic!("expected mesh, got {}", other.kind()),
        }
        assert_eq!(primitives[1].kind(), "colorbar");

        let axes = renderer.axes();
        assert_eq!(axes[0].x_axis.label.as_deref(), Some("FSC-H"));
        assert_eq!(axes[0].y_axis.label.as_deref(), Some("SSC-H"));
    }

    #[test]
    fn test_scatter_draws_densest_last() {
        let panel = density_panel(SmoothingOptions::disabled()).with_mode(RenderMode::Scatter);
        let mut fig = figure();
        PlotComposer::default().add_panel(panel).compose(&mut fig).unwrap();

        let renderer = fig.into_renderer();
        match renderer.primitives()[0] {
            DrawPrimitive::Scatter { xs, values, .. } => {
                assert_eq!(xs.len(), 4);
                assert!(values.windows(2).all(|w| w[0] <= w[1]));
                assert_eq!(*values.last().unwrap(), 2.0);
            }
            other => panic!("expected scatter, got {}", other.kind()),
        }
    }

    #[test]
    fn test_invalid_panel_leaves_figure_untouched() {
        let composer = PlotComposer::default()
            .add_panel(histogram_panel())
            .add_panel(density_panel(SmoothingOptions::disabled()).with_mode(RenderMode::Line));

        let mut fig = figure();
        let err = composer.compose(&mut fig).unwrap_err();
        assert!(matches!(err, CytoviewError::InvalidMode { .. }));
        assert!(fig.renderer().is_empty());
        assert_eq!(fig.num_axes(), 0);
    }

    #[test]
    fn test_combined_layout_regions() {
        let composer = PlotComposer::default()
            .with_layout(Layout::Combined)
            .add_panel(density_panel(SmoothingOptions::default()))
            .add_panel(histogram_panel())
            .add_panel(histogram_panel());

        let mut fig = figure();
        let ids = composer.compose(&mut fig).unwrap();
        assert_eq!(ids.len(), 3);

        let density = fig.axes(ids[0]).unwrap().region;
        let hist = fig.axes(ids[1]).unwrap().region;
        assert!(density.y < hist.y);

        let renderer = fig.into_renderer();
        assert!(matches!(
            renderer.commands()[0],
            DrawCommand::BeginFigure { grid, .. } if grid.rows == 2 && grid.cols == 2
        ));
    }

    #[test]
    fn test_empty_composer_is_an_error() {
        let mut fig = figure();
        assert!(matches!(
            PlotComposer::default().compose(&mut fig),
            Err(CytoviewError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_second_compose_into_same_figure_is_rejected() {
        let mut fig = figure();
        PlotComposer::default()
            .add_panel(histogram_panel())
            .add_panel(density_panel(SmoothingOptions::disabled()))
            .compose(&mut fig)
            .unwrap();
        let recorded = fig.renderer().commands().len();

        let again = PlotComposer::default()
            .add_panel(density_panel(SmoothingOptions::disabled()))
            .compose(&mut fig);
        assert!(matches!(again, Err(CytoviewError::InvalidConfig(_))));
        assert_eq!(fig.num_axes(), 2);
        assert_eq!(fig.renderer().commands().len(), recorded);
    }

    #[test]
    fn test_unknown_panel_colormap() {
        let mut style = PanelStyle::default();
        style.colormap = Some("rainbow".to_string());
        let panel = density_panel(SmoothingOptions::disabled()).with_style(style);
        let mut fig = figure();
        assert!(PlotComposer::default().add_panel(panel).compose(&mut fig).is_err());
        assert!(fig.renderer().is_empty());
    }
}
