//! Delimited-text event table reader
//!
//! The header row names the channels; every following row is one event.
//! Empty fields become NaN so a missing reading drops out of histograms
//! instead of aborting the load.

use crate::reader::{EventReader, IoError, IoResult};
use crate::schema::ChannelSchema;
use crate::table::EventTable;
use ndarray::Array2;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// CSV/TSV event table reader
pub struct CsvReader {
    path: String,
    schema: ChannelSchema,
    metadata: HashMap<String, String>,
    delimiter: u8,
}

impl CsvReader {
    /// Open a comma-separated file
    pub fn open(path: &str) -> IoResult<Self> {
        Self::open_with_delimiter(path, b',')
    }

    /// Open a delimited file with a custom delimiter
    pub fn open_with_delimiter(path: &str, delimiter: u8) -> IoResult<Self> {
        if !Path::new(path).exists() {
            return Err(IoError::FileNotFound(path.to_string()));
        }

        let mut reader = Self::reader(path, delimiter)?;
        let names: Vec<String> = reader
            .headers()
            .map_err(|e| IoError::InvalidFormat(e.to_string()))?
            .iter()
            .map(|s| s.trim().to_string())
            .collect();

        if names.is_empty() || names.iter().all(|n| n.is_empty()) {
            return Err(IoError::InvalidFormat(format!(
                "{} has no header row",
                path
            )));
        }

        let mut metadata = HashMap::new();
        metadata.insert("format".to_string(), "CSV".to_string());
        metadata.insert("delimiter".to_string(), (delimiter as char).to_string());

        let mut schema = ChannelSchema::from_names(names);
        schema.metadata = metadata.clone();

        Ok(Self {
            path: path.to_string(),
            schema,
            metadata,
            delimiter,
        })
    }

    /// Declare the value range of a channel, as an instrument header would
    pub fn with_channel_range(mut self, name: &str, min: f64, max: f64) -> IoResult<Self> {
        let index = self
            .schema
            .channel_index(name)
            .ok_or_else(|| IoError::UnknownChannel(name.to_string()))?;
        self.schema.channels[index].range = Some((min, max));
        Ok(self)
    }

    fn reader(path: &str, delimiter: u8) -> IoResult<csv::Reader<BufReader<File>>> {
        let file = File::open(path).map_err(|e| IoError::OpenFailed(e.to_string()))?;
        Ok(csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file)))
    }
}

impl EventReader for CsvReader {
    fn read_schema(&self) -> IoResult<ChannelSchema> {
        Ok(self.schema.clone())
    }

    fn read_table(&self) -> IoResult<EventTable> {
        let width = self.schema.num_channels();
        let mut reader = Self::reader(&self.path, self.delimiter)?;
        let mut flat = Vec::new();
        let mut rows = 0;

        for result in reader.records() {
            let record = result.map_err(|e| IoError::InvalidFormat(e.to_string()))?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(rows + 2);

            if record.len() != width {
                return Err(IoError::RaggedRow {
                    row: rows,
                    expected: width,
                    actual: record.len(),
                });
            }

            for (column, field) in record.iter().enumerate() {
                flat.push(parse_field(field, line, column)?);
            }
            rows += 1;
        }

        tracing::debug!(path = %self.path, events = rows, channels = width, "read event table");

        let data = Array2::from_shape_vec((rows, width), flat)
            .map_err(|e| IoError::InvalidFormat(e.to_string()))?;
        EventTable::new(self.schema.clone(), data)
    }

    fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    fn path(&self) -> Option<&str> {
        Some(&self.path)
    }

    fn format_name(&self) -> &'static str {
        "CSV"
    }
}

fn parse_field(field: &str, line: usize, column: usize) -> IoResult<f64> {
    if field.is_empty() {
        return Ok(f64::NAN);
    }
    field.parse::<f64>().map_err(|_| IoError::Parse {
        line,
        column,
        value: field.to_string(),
    })
}
