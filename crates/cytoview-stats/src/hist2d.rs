//! Two-dimensional joint frequency counting
//!
//! The grid is indexed `[i][j]` with `i` over x bins and `j` over y bins.
//! Each event's cell is recorded once at compute time so scatter-style
//! rendering can look up a per-event density without rebinning.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::edges::BinEdges;
use crate::error::{StatsError, StatsResult};
use crate::smooth::SmoothingOptions;

/// Which grid a density lookup reads from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DensitySource {
    /// Raw integer counts
    Raw,
    /// Smoothed grid, falling back to raw counts when smoothing was off
    #[default]
    Smoothed,
}

/// Joint counts of paired readings, with an optional smoothed grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram2D {
    edges_x: Arc<BinEdges>,
    edges_y: Arc<BinEdges>,
    counts: Array2<u64>,
    smoothed: Option<Array2<f64>>,
    cells: Vec<Option<(usize, usize)>>,
    included: usize,
}

impl Histogram2D {
    /// Count `(xs[k], ys[k])` pairs into the grid spanned by the two edge sets
    ///
    /// An event is counted only if both readings fall inside their range.
    pub fn compute(
        xs: &[f64],
        ys: &[f64],
        edges_x: Arc<BinEdges>,
        edges_y: Arc<BinEdges>,
        smoothing: &SmoothingOptions,
    ) -> StatsResult<Self> {
        if xs.len() != ys.len() {
            return Err(StatsError::DimensionMismatch {
                x: xs.len(),
                y: ys.len(),
            });
        }

        let (nx, ny) = (edges_x.n_bins(), edges_y.n_bins());
        // Resolve the smoother before counting so a bad sigma fails fast
        let smoother = if smoothing.enabled {
            Some(smoothing.smoother_for(nx, ny)?)
        } else {
            None
        };

        let mut counts = Array2::<u64>::zeros((nx, ny));
        let cells: Vec<Option<(usize, usize)>> = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| match (edges_x.bin_index(x), edges_y.bin_index(y)) {
                (Some(i), Some(j)) => {
                    counts[[i, j]] += 1;
                    Some((i, j))
                }
                _ => None,
            })
            .collect();

        let included = cells.iter().filter(|c| c.is_some()).count();
        if included == 0 && !xs.is_empty() {
            tracing::warn!(events = xs.len(), "every event fell outside the 2D histogram range");
        } else {
            tracing::debug!(
                included,
                excluded = xs.len() - included,
                nx,
                ny,
                "counted 2D histogram"
            );
        }

        let smoothed = smoother.map(|s| s.smooth(&counts.mapv(|c| c as f64)));

        Ok(Self {
            edges_x,
            edges_y,
            counts,
            smoothed,
            cells,
            included,
        })
    }

    pub fn edges_x(&self) -> &Arc<BinEdges> {
        &self.edges_x
    }

    pub fn edges_y(&self) -> &Arc<BinEdges> {
        &self.edges_y
    }

    /// Raw count grid
    pub fn counts(&self) -> &Array2<u64> {
        &self.counts
    }

    /// Smoothed grid, when smoothing was requested
    pub fn smoothed(&self) -> Option<&Array2<f64>> {
        self.smoothed.as_ref()
    }

    pub fn is_smoothed(&self) -> bool {
        self.smoothed.is_some()
    }

    /// Bin cell of every input event, `None` for excluded events
    pub fn cells(&self) -> &[Option<(usize, usize)>] {
        &self.cells
    }

    /// Number of events counted into the grid
    pub fn included(&self) -> usize {
        self.included
    }

    /// Number of events with at least one reading out of range
    pub fn excluded(&self) -> usize {
        self.cells.len() - self.included
    }

    /// Grid read by `source`, as reals
    pub fn grid(&self, source: DensitySource) -> Array2<f64> {
        match (source, &self.smoothed) {
            (DensitySource::Smoothed, Some(smoothed)) => smoothed.clone(),
            _ => self.counts.mapv(|c| c as f64),
        }
    }

    /// Grid used for density rendering: smoothed when available
    pub fn density_grid(&self) -> Array2<f64> {
        self.grid(DensitySource::Smoothed)
    }

    /// Grid scaled to sum to 1 (a probability mass function)
    ///
    /// A grid with no mass stays all zero.
    pub fn normalized(&self, source: DensitySource) -> Array2<f64> {
        let grid = self.grid(source);
        let total = grid.sum();
        if total > 0.0 {
            grid / total
        } else {
            grid
        }
    }

    /// Density at the cell of event `index`
    pub fn event_density(&self, index: usize, source: DensitySource) -> Option<f64> {
        let (i, j) = (*self.cells.get(index)?)?;
        Some(self.value_at(i, j, source))
    }

    /// Density at every event's cell, `None` for excluded events
    pub fn event_densities(&self, source: DensitySource) -> Vec<Option<f64>> {
        self.cells
            .iter()
            .map(|cell| cell.map(|(i, j)| self.value_at(i, j, source)))
            .collect()
    }

    fn value_at(&self, i: usize, j: usize, source: DensitySource) -> f64 {
        match (source, &self.smoothed) {
            (DensitySource::Smoothed, Some(smoothed)) => smoothed[[i, j]],
            _ => self.counts[[i, j]] as f64,
        }
    }
}
