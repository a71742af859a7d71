//! Renderer seam and draw primitives
//!
//! The composer decides what goes where; a [`Renderer`] turns the result
//! into pixels, vector output or anything else. Every call a figure makes
//! into its renderer goes through this trait, in the order
//! `begin_figure`, then for each panel `begin_axes`, `draw`*, `end_axes`,
//! and finally `end_figure`.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::axis::AxisConfig;
use crate::colormap::{Color, ColormapConfig};
use crate::figure::FigureOptions;
use crate::layout::{GridShape, PanelRegion};

/// Placement and axes of one panel
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxesSpec {
    pub region: PanelRegion,
    pub x_axis: AxisConfig,
    pub y_axis: AxisConfig,
    pub title: Option<String>,
}

/// One drawing instruction within a panel
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawPrimitive {
    /// One filled rectangle per bin from `edges[i]` to `edges[i+1]`
    Bars {
        edges: Vec<f64>,
        heights: Vec<f64>,
        face: Color,
        edge: Option<Color>,
        label: Option<String>,
    },
    /// Stepped outline over the bins, optionally filled down to zero
    Steps {
        edges: Vec<f64>,
        heights: Vec<f64>,
        color: Color,
        filled: bool,
        edge: Option<Color>,
        label: Option<String>,
    },
    /// Colored surface; `values[[i, j]]` covers x bin `i` and y bin `j`
    Mesh {
        x_edges: Vec<f64>,
        y_edges: Vec<f64>,
        values: Array2<f64>,
        colormap: ColormapConfig,
        /// Cells with a zero value stay undrawn
        mask_zero: bool,
        alpha: f32,
    },
    /// Points colored by value, drawn in the order given
    Scatter {
        xs: Vec<f64>,
        ys: Vec<f64>,
        values: Vec<f64>,
        colormap: ColormapConfig,
        size: f32,
        alpha: f32,
    },
    Colorbar {
        colormap: ColormapConfig,
        label: Option<String>,
    },
    Legend {
        entries: Vec<(String, Color)>,
    },
}

impl DrawPrimitive {
    pub fn kind(&self) -> &'static str {
        match self {
            DrawPrimitive::Bars { .. } => "bars",
            DrawPrimitive::Steps { .. } => "steps",
            DrawPrimitive::Mesh { .. } => "mesh",
            DrawPrimitive::Scatter { .. } => "scatter",
            DrawPrimitive::Colorbar { .. } => "colorbar",
            DrawPrimitive::Legend { .. } => "legend",
        }
    }
}

/// Backend that receives a figure's drawing calls
pub trait Renderer {
    fn begin_figure(&mut self, options: &FigureOptions, grid: GridShape);

    fn begin_axes(&mut self, axes: &AxesSpec);

    fn draw(&mut self, primitive: &DrawPrimitive);

    fn end_axes(&mut self);

    fn end_figure(&mut self);
}

/// A renderer call, as recorded by [`RecordingRenderer`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum DrawCommand {
    BeginFigure {
        options: FigureOptions,
        grid: GridShape,
    },
    BeginAxes {
        axes: AxesSpec,
    },
    Draw {
        primitive: DrawPrimitive,
    },
    EndAxes,
    EndFigure,
}

/// Renderer that keeps every call it receives
///
/// Useful for tests, and as a display list an external backend can
/// replay from JSON.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingRenderer {
    commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Axes opened so far, in order
    pub fn axes(&self) -> Vec<&AxesSpec> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::BeginAxes { axes } => Some(axes),
                _ => None,
            })
            .collect()
    }

    /// Primitives drawn so far, in order
    pub fn primitives(&self) -> Vec<&DrawPrimitive> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Draw { primitive } => Some(primitive),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Export the recorded display list
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.commands)
    }

    /// Load a display list exported with [`RecordingRenderer::to_json`]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            commands: serde_json::from_str(json)?,
        })
    }
}

impl Renderer for RecordingRenderer {
    fn begin_figure(&mut self, options: &FigureOptions, grid: GridShape) {
        self.commands.push(DrawCommand::BeginFigure {
            options: options.clone(),
            grid,
        });
    }

    fn begin_axes(&mut self, axes: &AxesSpec) {
        self.commands.push(DrawCommand::BeginAxes { axes: axes.clone() });
    }

    fn draw(&mut self, primitive: &DrawPrimitive) {
        self.commands.push(DrawCommand::Draw {
            primitive: primitive.clone(),
        });
    }

    fn end_axes(&mut self) {
        self.commands.push(DrawCommand::EndAxes);
    }

    fn end_figure(&mut self) {
        self.commands.push(DrawCommand::EndFigure);
    }
}
