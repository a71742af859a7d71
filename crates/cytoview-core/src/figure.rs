//! Figure handle
//!
//! A [`Figure`] owns its renderer and tracks the axes added to it and the
//! current axes. It is passed explicitly to every plotting call, so there
//! is no process-wide "current figure".

use serde::{Deserialize, Serialize};

use crate::error::{CytoviewError, CytoviewResult};
use crate::layout::GridShape;
use crate::render::{AxesSpec, DrawPrimitive, Renderer};

/// Figure-level options shared by all panels
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FigureOptions {
    /// Size in points
    pub width: f32,
    pub height: f32,
    pub title: Option<String>,
}

impl FigureOptions {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Size fitting `grid` panels of the given dimensions
    pub fn for_grid(grid: GridShape, panel_width: f32, panel_height: f32) -> Self {
        Self::new(panel_width * grid.cols as f32, panel_height * grid.rows as f32)
    }
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self::new(640.0, 480.0)
    }
}

/// Handle to one axes within a figure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxesId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FigureState {
    Empty,
    Open,
    Finished,
}

/// A figure being drawn
pub struct Figure<R: Renderer> {
    renderer: R,
    options: FigureOptions,
    axes: Vec<AxesSpec>,
    current: Option<AxesId>,
    axes_open: bool,
    grid: Option<GridShape>,
    state: FigureState,
}

impl<R: Renderer> Figure<R> {
    pub fn new(renderer: R, options: FigureOptions) -> Self {
        Self {
            renderer,
            options,
            axes: Vec::new(),
            current: None,
            axes_open: false,
            grid: None,
            state: FigureState::Empty,
        }
    }

    pub fn options(&self) -> &FigureOptions {
        &self.options
    }

    /// Change options before anything is drawn
    pub fn options_mut(&mut self) -> CytoviewResult<&mut FigureOptions> {
        match self.state {
            FigureState::Empty => Ok(&mut self.options),
            _ => Err(CytoviewError::InvalidConfig(
                "figure options are fixed once drawing starts".to_string(),
            )),
        }
    }

    /// Error unless more panels can still be added
    pub fn ensure_writable(&self) -> CytoviewResult<()> {
        if self.state == FigureState::Finished {
            return Err(CytoviewError::InvalidConfig(
                "figure is already finished".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.state == FigureState::Finished
    }

    /// Start the figure on `grid`
    ///
    /// Starting an open figure again is accepted only with the same grid.
    pub fn begin(&mut self, grid: GridShape) -> CytoviewResult<()> {
        match self.state {
            FigureState::Empty => {
                self.renderer.begin_figure(&self.options, grid);
                self.grid = Some(grid);
                self.state = FigureState::Open;
                Ok(())
            }
            FigureState::Open if self.grid == Some(grid) => Ok(()),
            FigureState::Open => Err(CytoviewError::InvalidConfig(format!(
                "figure is already laid out as {}x{}, cannot switch to {}x{}",
                self.grid.map_or(0, |g| g.rows),
                self.grid.map_or(0, |g| g.cols),
                grid.rows,
                grid.cols
            ))),
            FigureState::Finished => self.ensure_writable(),
        }
    }

    /// Grid the figure was started on
    pub fn grid(&self) -> Option<GridShape> {
        self.grid
    }

    /// Add axes and make them current
    pub fn add_axes(&mut self, spec: AxesSpec) -> CytoviewResult<AxesId> {
        if self.state == FigureState::Empty {
            self.begin(GridShape::new(1, 1))?;
        }
        self.ensure_writable()?;
        self.close_axes();

        self.renderer.begin_axes(&spec);
        self.axes.push(spec);
        self.axes_open = true;

        let id = AxesId(self.axes.len() - 1);
        self.current = Some(id);
        Ok(id)
    }

    pub fn current_axes(&self) -> Option<AxesId> {
        self.current
    }

    pub fn axes(&self, id: AxesId) -> Option<&AxesSpec> {
        self.axes.get(id.0)
    }

    pub fn num_axes(&self) -> usize {
        self.axes.len()
    }

    /// Draw into the current axes, creating full-figure axes if there are none
    pub fn draw(&mut self, primitive: &DrawPrimitive) -> CytoviewResult<()> {
        if self.current.is_none() {
            self.add_axes(AxesSpec::default())?;
        }
        self.ensure_writable()?;
        self.renderer.draw(primitive);
        Ok(())
    }

    /// Close the figure; later calls do nothing
    pub fn finish(&mut self) {
        if self.state == FigureState::Open {
            self.close_axes();
            self.renderer.end_figure();
        }
        self.state = FigureState::Finished;
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Finish the figure and hand back its renderer
    pub fn into_renderer(mut self) -> R {
        self.finish();
        self.renderer
    }

    fn close_axes(&mut self) {
        if self.axes_open {
            self.renderer.end_axes();
            self.axes_open = false;
        }
    }
}
