//! Event reader trait and common types
//!
//! The `EventReader` trait is the seam to whatever produces event tables.
//! Instrument formats live outside this crate; delimited text is built in.

use crate::schema::ChannelSchema;
use crate::table::EventTable;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while obtaining or addressing event data
#[derive(Debug, Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to open file: {0}")]
    OpenFailed(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("Row {row} has {actual} readings, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Could not parse value '{value}' at line {line}, column {column}")]
    Parse {
        line: usize,
        column: usize,
        value: String,
    },

    #[error("I/O error: {0}")]
    Io(String),
}

/// Result alias used throughout cytoview-io
pub type IoResult<T> = Result<T, IoError>;

/// Anything that can produce an event table
pub trait EventReader {
    /// Channel schema, without loading the events
    fn read_schema(&self) -> IoResult<ChannelSchema>;

    /// Load every event
    fn read_table(&self) -> IoResult<EventTable>;

    /// Source-level key/value metadata
    fn metadata(&self) -> &HashMap<String, String>;

    /// Backing file, for readers that have one
    fn path(&self) -> Option<&str> {
        None
    }

    /// Short format label, e.g. "CSV"
    fn format_name(&self) -> &'static str;
}

/// Reader chosen at runtime
pub type BoxedReader = Box<dyn EventReader>;

/// Pick a reader for `path` from its extension
pub fn open_file(path: &str) -> IoResult<BoxedReader> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        #[cfg(feature = "csv")]
        "csv" | "txt" => Ok(Box::new(crate::csv_reader::CsvReader::open(path)?)),

        #[cfg(feature = "csv")]
        "tsv" => Ok(Box::new(crate::csv_reader::CsvReader::open_with_delimiter(
            path, b'\t',
        )?)),

        other => Err(IoError::InvalidFormat(format!(
            "no event reader for '.{}' files",
            other
        ))),
    }
}

/// Extensions `open_file` understands with the enabled features
pub fn supported_extensions() -> &'static [&'static str] {
    #[cfg(feature = "csv")]
    {
        &["csv", "tsv", "txt"]
    }
    #[cfg(not(feature = "csv"))]
    {
        &[]
    }
}
