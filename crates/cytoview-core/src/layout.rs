//! Grid layout of panels within a figure
//!
//! Panels are placed on a rows × columns grid resolved once, when the
//! figure is composed. Regions are in normalized figure coordinates with
//! the origin at the top-left corner.

use serde::{Deserialize, Serialize};

use crate::error::{CytoviewError, CytoviewResult};

/// Rows and columns of a panel grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Smallest row-major grid holding `n` panels at most `max_cols` wide
    pub fn fit(n: usize, max_cols: usize) -> Self {
        let cols = n.min(max_cols.max(1)).max(1);
        Self {
            rows: n.div_ceil(cols).max(1),
            cols,
        }
    }

    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    /// Region of `cell`, inset by `spacing` (a fraction of the cell size)
    pub fn region(&self, cell: GridCell, spacing: f32) -> PanelRegion {
        let cell_w = 1.0 / self.cols as f32;
        let cell_h = 1.0 / self.rows as f32;
        let pad = spacing.clamp(0.0, 0.9) / 2.0;

        PanelRegion {
            x: (cell.col as f32 + pad) * cell_w,
            y: (cell.row as f32 + pad) * cell_h,
            width: (1.0 - 2.0 * pad) * cell_w,
            height: (1.0 - 2.0 * pad) * cell_h,
        }
    }
}

/// Row and column of one panel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

/// Normalized figure rectangle of one panel
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for PanelRegion {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

/// Panel kind, as far as placement is concerned
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelKind {
    Density,
    Histogram,
}

/// Placement strategy for a figure's panels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    /// Row-major, as square as the column limit allows
    #[default]
    Auto,
    /// Row-major on a fixed grid
    Grid { rows: usize, cols: usize },
    /// Density panels first, then histogram panels starting on a new row
    Combined,
}

impl Layout {
    /// Resolve the grid and the cell of every panel, in panel order
    pub fn place(
        &self,
        kinds: &[PanelKind],
        max_cols: usize,
    ) -> CytoviewResult<(GridShape, Vec<GridCell>)> {
        if kinds.is_empty() {
            return Err(CytoviewError::InvalidConfig(
                "a figure needs at least one panel".to_string(),
            ));
        }

        match *self {
            Layout::Auto => {
                let shape = GridShape::fit(kinds.len(), max_cols);
                Ok((shape, row_major(kinds.len(), shape.cols, 0)))
            }
            Layout::Grid { rows, cols } => {
                let shape = GridShape::new(rows, cols);
                if rows == 0 || cols == 0 || shape.capacity() < kinds.len() {
                    return Err(CytoviewError::InvalidConfig(format!(
                        "a {}x{} grid cannot hold {} panels",
                        rows,
                        cols,
                        kinds.len()
                    )));
                }
                Ok((shape, row_major(kinds.len(), cols, 0)))
            }
            Layout::Combined => Ok(combined(kinds, max_cols)),
        }
    }
}

fn row_major(n: usize, cols: usize, first_row: usize) -> Vec<GridCell> {
    (0..n)
        .map(|k| GridCell {
            row: first_row + k / cols,
            col: k % cols,
        })
        .collect()
}

fn combined(kinds: &[PanelKind], max_cols: usize) -> (GridShape, Vec<GridCell>) {
    let n_density = kinds.iter().filter(|&&k| k == PanelKind::Density).count();
    let n_hist = kinds.len() - n_density;

    let cols = n_density.max(n_hist).min(max_cols.max(1)).max(1);
    let density_rows = n_density.div_ceil(cols);
    let hist_rows = n_hist.div_ceil(cols);

    let density_cells = row_major(n_density, cols, 0);
    let hist_cells = row_major(n_hist, cols, density_rows);

    // Hand cells back in the caller's panel order
    let (mut d, mut h) = (density_cells.into_iter(), hist_cells.into_iter());
    let cells = kinds
        .iter()
        .filter_map(|kind| match kind {
            PanelKind::Density => d.next(),
            PanelKind::Histogram => h.next(),
        })
        .collect();

    (GridShape::new(density_rows + hist_rows, cols), cells)
}
