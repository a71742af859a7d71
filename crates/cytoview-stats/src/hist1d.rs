//! One-dimensional frequency counting
//!
//! Readings outside the binned range (and NaN readings) are not an error:
//! they are left out of the counts and tallied in `excluded`, so
//! `sum(counts) + excluded == number of readings` always holds.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::edges::BinEdges;

/// Per-bin counts of one dataset over a set of bin edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram1D {
    edges: Arc<BinEdges>,
    counts: Vec<u64>,
    excluded: usize,
    density: Option<Vec<f64>>,
}

impl Histogram1D {
    /// Count `values` into `edges`
    ///
    /// With `density`, a per-bin density `counts[i] / (included * width[i])`
    /// is also computed so the histogram integrates to 1 over the range.
    pub fn compute(values: &[f64], edges: Arc<BinEdges>, density: bool) -> Self {
        let mut counts = vec![0u64; edges.n_bins()];
        let mut excluded = 0;

        for &value in values {
            match edges.bin_index(value) {
                Some(i) => counts[i] += 1,
                None => excluded += 1,
            }
        }

        let included = values.len() - excluded;
        if included == 0 && !values.is_empty() {
            tracing::warn!(
                events = values.len(),
                low = edges.first(),
                high = edges.last(),
                "every event fell outside the histogram range"
            );
        } else {
            tracing::debug!(included, excluded, bins = counts.len(), "counted 1D histogram");
        }

        let density = density.then(|| density_of(&counts, &edges, included));

        Self {
            edges,
            counts,
            excluded,
            density,
        }
    }

    /// Count several datasets over the same edges for an overlay
    ///
    /// Every result shares the one `BinEdges` allocation so panels line up.
    pub fn compute_overlay(datasets: &[&[f64]], edges: &Arc<BinEdges>, density: bool) -> Vec<Self> {
        datasets
            .iter()
            .map(|values| Self::compute(values, Arc::clone(edges), density))
            .collect()
    }

    pub fn edges(&self) -> &Arc<BinEdges> {
        &self.edges
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Density variant, present when requested at compute time
    pub fn density(&self) -> Option<&[f64]> {
        self.density.as_deref()
    }

    /// Number of readings left out of the counts
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    /// Number of readings counted into a bin
    pub fn included(&self) -> usize {
        self.counts.iter().sum::<u64>() as usize
    }

    /// Number of readings seen
    pub fn total(&self) -> usize {
        self.included() + self.excluded
    }

    /// Heights to draw: the density when present, raw counts otherwise
    pub fn heights(&self) -> Vec<f64> {
        match &self.density {
            Some(density) => density.clone(),
            None => self.counts.iter().map(|&c| c as f64).collect(),
        }
    }

    /// Heights rescaled so the tallest bin equals 1
    pub fn normalized_height(&self) -> Vec<f64> {
        let heights = self.heights();
        let peak = heights.iter().copied().fold(0.0, f64::max);
        if peak > 0.0 {
            heights.into_iter().map(|h| h / peak).collect()
        } else {
            heights
        }
    }
}

fn density_of(counts: &[u64], edges: &BinEdges, included: usize) -> Vec<f64> {
    if included == 0 {
        return vec![0.0; counts.len()];
    }
    let total = included as f64;
    counts
        .iter()
        .enumerate()
        .map(|(i, &c)| c as f64 / (total * edges.width(i)))
        .collect()
}
