//! cytoview-io - Event table access for cytometry visualization
//!
//! This crate provides the data side of cytoview:
//!
//! - **EventTable**: immutable events × channels matrix with a channel schema
//! - **ChannelSelector**: channel lookup by name or column index
//! - **EventReader**: uniform access to event sources
//! - **CSV**: delimited text tables with a channel-name header
//!
//! # Design
//!
//! Instrument file formats and calibration are handled upstream. Tables
//! arrive here already in the units the caller wants to plot.

pub mod reader;
pub mod schema;
pub mod table;

#[cfg(feature = "csv")]
pub mod csv_reader;

pub use reader::*;
pub use schema::*;
pub use table::*;
