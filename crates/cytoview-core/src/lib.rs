//! cytoview-core - Histogram and density figures for flow cytometry
//!
//! This crate turns event tables into multi-panel figures of 1D intensity
//! histograms and 2D density maps of channel pairs.
//!
//! # Key Components
//!
//! - **Operations**: `histogram1d`, `density2d`, `plot_histogram1d`, `plot_density2d`, `combined_layout`
//! - **PlotSpec**: one panel, its data, render mode, labels and style
//! - **PlotComposer**: collects panels and lays them out on a grid
//! - **Figure**: explicit figure handle owning a `Renderer`
//! - **PlotConfig**: figure-wide defaults, loadable from JSON or TOML
//!
//! # Render Modes
//!
//! - **Bar** / **Line**: 1D histograms, overlaid when several datasets are given
//! - **Mesh**: density grid as a colored surface, empty cells masked
//! - **Scatter**: one point per event colored by local density, densest on top
//!
//! Binning and smoothing live in `cytoview-stats` and event tables in
//! `cytoview-io`; both are re-exported here.

pub mod api;
pub mod axis;
pub mod colormap;
pub mod composer;
pub mod config;
pub mod error;
pub mod figure;
pub mod layout;
pub mod plot;
pub mod render;

pub use api::*;
pub use axis::*;
pub use colormap::*;
pub use composer::*;
pub use config::*;
pub use error::*;
pub use figure::*;
pub use layout::*;
pub use plot::*;
pub use render::*;

pub use cytoview_io as io;
pub use cytoview_stats as stats;
