//! cytoview-stats - Binning and density estimation for cytometry data
//!
//! This crate turns raw channel readings into renderable grids:
//!
//! - **BinEdges**: linear or logarithmic bin boundaries, or validated explicit edges
//! - **Histogram1D**: per-bin counts with optional per-bin density normalization
//! - **Histogram2D**: joint counts of channel pairs with per-event cell lookup
//! - **GaussianSmoother**: separable Gaussian filter over 2D count grids
//!
//! # Conventions
//!
//! Bins are half-open except the last, which is closed on both ends.
//! Readings outside the binned range are excluded from counts, never an
//! error. All computations are pure and deterministic.

pub mod edges;
pub mod error;
pub mod hist1d;
pub mod hist2d;
pub mod range;
pub mod smooth;

pub use edges::*;
pub use error::*;
pub use hist1d::*;
pub use hist2d::*;
pub use range::*;
pub use smooth::*;
