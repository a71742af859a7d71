//! Public plotting operations
//!
//! `histogram1d` and `density2d` compute results from event tables;
//! `plot_histogram1d`, `plot_density2d` and `combined_layout` also compose
//! them into a figure. All validation happens before anything is drawn.

use cytoview_io::{ChannelSelector, EventTable};
use cytoview_stats::{
    channel_bounds, BinEdges, BinSpec, Histogram1D, Histogram2D, Scale, SmoothingOptions,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::composer::PlotComposer;
use crate::config::{HistType, PlotConfig};
use crate::error::{CytoviewError, CytoviewResult};
use crate::figure::{AxesId, Figure};
use crate::layout::Layout;
use crate::plot::{Density2D, PanelStyle, PlotSpec, RenderMode};
use crate::render::Renderer;

/// Parameters of a 1D histogram
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hist1DParams {
    pub bins: BinSpec,
    pub scale: Scale,
    /// Also compute the per-bin probability density
    pub density: bool,
}

impl Hist1DParams {
    /// Defaults taken from a figure configuration
    pub fn from_config(config: &PlotConfig) -> Self {
        Self {
            bins: BinSpec::Count(config.binning.bins),
            scale: config.binning.x_scale,
            density: false,
        }
    }

    pub fn with_bins(mut self, bins: impl Into<BinSpec>) -> Self {
        self.bins = bins.into();
        self
    }

    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    /// Set the scale from its name
    pub fn with_scale_str(self, scale: &str) -> CytoviewResult<Self> {
        Ok(self.with_scale(scale.parse()?))
    }

    pub fn with_density(mut self, density: bool) -> Self {
        self.density = density;
        self
    }
}

/// Parameters of a 2D density map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Density2DParams {
    /// Bins along x and y
    pub bins: (BinSpec, BinSpec),
    /// Scales of x and y
    pub scales: (Scale, Scale),
    pub mode: RenderMode,
    pub smoothing: SmoothingOptions,
}

impl Default for Density2DParams {
    fn default() -> Self {
        Self {
            bins: (BinSpec::default(), BinSpec::default()),
            scales: (Scale::Linear, Scale::Linear),
            mode: RenderMode::Mesh,
            smoothing: SmoothingOptions::default(),
        }
    }
}

impl Density2DParams {
    /// Defaults taken from a figure configuration
    pub fn from_config(config: &PlotConfig) -> Self {
        let bins = BinSpec::Count(config.binning.bins);
        Self {
            bins: (bins.clone(), bins),
            scales: (config.binning.x_scale, config.binning.y_scale),
            mode: RenderMode::Mesh,
            smoothing: config.smoothing.options(),
        }
    }

    /// Same bins on both axes
    pub fn with_bins(mut self, bins: impl Into<BinSpec>) -> Self {
        let bins = bins.into();
        self.bins = (bins.clone(), bins);
        self
    }

    pub fn with_bins_xy(mut self, x: impl Into<BinSpec>, y: impl Into<BinSpec>) -> Self {
        self.bins = (x.into(), y.into());
        self
    }

    pub fn with_scales(mut self, x: Scale, y: Scale) -> Self {
        self.scales = (x, y);
        self
    }

    /// Set both scales from their names
    pub fn with_scales_str(self, x: &str, y: &str) -> CytoviewResult<Self> {
        Ok(self.with_scales(x.parse()?, y.parse()?))
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the mode from its name; only `mesh` and `scatter` are accepted
    pub fn with_mode_str(self, mode: &str) -> CytoviewResult<Self> {
        let mode: RenderMode = mode.parse()?;
        check_density_mode(mode)?;
        Ok(self.with_mode(mode))
    }

    pub fn with_smoothing(mut self, enabled: bool) -> Self {
        self.smoothing.enabled = enabled;
        self
    }

    /// Smooth with an explicit sigma, in bins
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.smoothing.enabled = true;
        self.smoothing.sigma = Some(sigma);
        self
    }
}

fn check_density_mode(mode: RenderMode) -> CytoviewResult<()> {
    if mode.is_2d() {
        Ok(())
    } else {
        Err(CytoviewError::InvalidMode {
            mode: mode.name().to_string(),
            context: "density map".to_string(),
        })
    }
}

/// Edges for one channel: explicit edges as given, or a count over the
/// channel's declared range or data extent
fn channel_edges(
    bins: &BinSpec,
    scale: Scale,
    values: &[f64],
    declared: Option<(f64, f64)>,
) -> CytoviewResult<Arc<BinEdges>> {
    let edges = match bins {
        BinSpec::Edges(_) => BinEdges::resolve(bins, scale, f64::NAN, f64::NAN)?,
        BinSpec::Count(_) => {
            let (min, max) = channel_bounds(values, declared, scale)?;
            BinEdges::resolve(bins, scale, min, max)?
        }
    };
    Ok(Arc::new(edges))
}

/// Histogram `channel` of every dataset over one shared set of edges
///
/// The range comes from the first dataset's declared channel range, or
/// else the combined data of all datasets, so overlays line up.
pub fn histogram1d(
    datasets: &[&EventTable],
    channel: &ChannelSelector,
    params: &Hist1DParams,
) -> CytoviewResult<Vec<Histogram1D>> {
    let first = datasets.first().ok_or_else(|| {
        CytoviewError::InvalidConfig("histogram1d needs at least one dataset".to_string())
    })?;

    let columns = datasets
        .iter()
        .map(|table| table.column_vec(channel))
        .collect::<Result<Vec<_>, _>>()?;
    let declared = first.descriptor(channel)?.range;

    let edges = match declared {
        Some(_) => channel_edges(&params.bins, params.scale, &[], declared)?,
        None => {
            let combined: Vec<f64> = columns.iter().flatten().copied().collect();
            channel_edges(&params.bins, params.scale, &combined, None)?
        }
    };

    tracing::debug!(
        %channel,
        datasets = datasets.len(),
        bins = edges.n_bins(),
        scale = %params.scale,
        "computing histogram"
    );

    let slices: Vec<&[f64]> = columns.iter().map(Vec::as_slice).collect();
    Ok(Histogram1D::compute_overlay(&slices, &edges, params.density))
}

/// Density map of the `[x, y]` channel pair of `table`
pub fn density2d(
    table: &EventTable,
    channels: [&ChannelSelector; 2],
    params: &Density2DParams,
) -> CytoviewResult<Density2D> {
    let [x_sel, y_sel] = channels;
    let x_desc = table.descriptor(x_sel)?;
    let y_desc = table.descriptor(y_sel)?;

    density2d_arrays(
        table.column_vec(x_sel)?,
        table.column_vec(y_sel)?,
        (x_desc.range, y_desc.range),
        (x_desc.name.as_str(), y_desc.name.as_str()),
        params,
    )
}

/// Density map of paired readings that are not in an event table
///
/// `declared` optionally fixes the x and y ranges; `names` label the axes.
pub fn density2d_arrays(
    xs: Vec<f64>,
    ys: Vec<f64>,
    declared: (Option<(f64, f64)>, Option<(f64, f64)>),
    names: (&str, &str),
    params: &Density2DParams,
) -> CytoviewResult<Density2D> {
    check_density_mode(params.mode)?;
    if xs.len() != ys.len() {
        return Err(CytoviewError::DimensionMismatch {
            x: xs.len(),
            y: ys.len(),
        });
    }

    let edges_x = channel_edges(&params.bins.0, params.scales.0, &xs, declared.0)?;
    let edges_y = channel_edges(&params.bins.1, params.scales.1, &ys, declared.1)?;

    tracing::debug!(
        x = names.0,
        y = names.1,
        events = xs.len(),
        smoothing = params.smoothing.enabled,
        "computing density map"
    );

    let histogram = Histogram2D::compute(&xs, &ys, edges_x, edges_y, &params.smoothing)?;
    Density2D::new(histogram, xs, ys, names.0, names.1)
}

/// One density panel of a combined figure
#[derive(Debug, Clone)]
pub struct DensitySpec {
    pub channels: [ChannelSelector; 2],
    pub params: Density2DParams,
    pub style: PanelStyle,
    pub title: Option<String>,
}

impl DensitySpec {
    pub fn new(x: impl Into<ChannelSelector>, y: impl Into<ChannelSelector>) -> Self {
        Self {
            channels: [x.into(), y.into()],
            params: Density2DParams::default(),
            style: PanelStyle::default(),
            title: None,
        }
    }

    pub fn with_params(mut self, params: Density2DParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_style(mut self, style: PanelStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// The histogram panels of a combined figure, one per channel
#[derive(Debug, Clone)]
pub struct HistSpec {
    pub channels: Vec<ChannelSelector>,
    pub params: Hist1DParams,
    pub hist_type: HistType,
    pub style: PanelStyle,
}

impl HistSpec {
    pub fn new<I, C>(channels: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ChannelSelector>,
    {
        Self {
            channels: channels.into_iter().map(Into::into).collect(),
            params: Hist1DParams::default(),
            hist_type: HistType::default(),
            style: PanelStyle::default(),
        }
    }

    pub fn with_params(mut self, params: Hist1DParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_hist_type(mut self, hist_type: HistType) -> Self {
        self.hist_type = hist_type;
        self
    }

    pub fn with_style(mut self, style: PanelStyle) -> Self {
        self.style = style;
        self
    }
}

/// Compute and draw one histogram panel overlaying `datasets`
pub fn plot_histogram1d<R: Renderer>(
    figure: &mut Figure<R>,
    datasets: &[&EventTable],
    channel: &ChannelSelector,
    params: &Hist1DParams,
    hist_type: HistType,
    style: PanelStyle,
    config: &PlotConfig,
) -> CytoviewResult<AxesId> {
    let histograms = histogram1d(datasets, channel, params)?;
    let name = datasets[0].descriptor(channel)?.name.clone();
    let panel = histogram_panel(histograms, name, hist_type, style);

    first_axes(PlotComposer::new(config.clone()).add_panel(panel).compose(figure)?)
}

/// Compute and draw one density panel
pub fn plot_density2d<R: Renderer>(
    figure: &mut Figure<R>,
    table: &EventTable,
    channels: [&ChannelSelector; 2],
    params: &Density2DParams,
    style: PanelStyle,
    config: &PlotConfig,
) -> CytoviewResult<AxesId> {
    let density = density2d(table, channels, params)?;
    let panel = PlotSpec::density(density)
        .with_mode(params.mode)
        .with_style(style);

    first_axes(PlotComposer::new(config.clone()).add_panel(panel).compose(figure)?)
}

/// Draw density panels followed by histogram panels in one figure
///
/// Density panels use the last dataset (typically the gated population);
/// histogram panels overlay every dataset in order. Every result is
/// computed before the figure is touched.
pub fn combined_layout<R: Renderer>(
    figure: &mut Figure<R>,
    datasets: &[&EventTable],
    density_specs: &[DensitySpec],
    hist_spec: Option<&HistSpec>,
    config: &PlotConfig,
) -> CytoviewResult<Vec<AxesId>> {
    let primary = datasets.last().ok_or_else(|| {
        CytoviewError::InvalidConfig("combined layout needs at least one dataset".to_string())
    })?;

    let mut composer = PlotComposer::new(config.clone()).with_layout(Layout::Combined);

    for spec in density_specs {
        let [x, y] = &spec.channels;
        let density = density2d(primary, [x, y], &spec.params)?;
        let mut panel = PlotSpec::density(density)
            .with_mode(spec.params.mode)
            .with_style(spec.style.clone());
        panel.title = spec.title.clone();
        composer.push_panel(panel);
    }

    if let Some(hist_spec) = hist_spec {
        for channel in &hist_spec.channels {
            let histograms = histogram1d(datasets, channel, &hist_spec.params)?;
            let name = primary.descriptor(channel)?.name.clone();
            composer.push_panel(histogram_panel(
                histograms,
                name,
                hist_spec.hist_type,
                hist_spec.style.clone(),
            ));
        }
    }

    composer.compose(figure)
}

fn histogram_panel(
    histograms: Vec<Histogram1D>,
    channel: String,
    hist_type: HistType,
    mut style: PanelStyle,
) -> PlotSpec {
    style.filled.get_or_insert(hist_type.is_filled());
    PlotSpec::histogram(histograms, channel)
        .with_mode(RenderMode::for_hist_type(hist_type))
        .with_style(style)
}

fn first_axes(ids: Vec<AxesId>) -> CytoviewResult<AxesId> {
    ids.into_iter()
        .next()
        .ok_or_else(|| CytoviewError::InvalidConfig("no axes were created".to_string()))
}
