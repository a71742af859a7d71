//! Channel schema and selectors for event tables

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::reader::{IoError, IoResult};

/// Schema describing the channels of an event table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelSchema {
    /// Channel descriptors, in column order
    pub channels: Vec<ChannelDescriptor>,

    /// Additional metadata (instrument, acquisition date, ...)
    pub metadata: HashMap<String, String>,
}

impl ChannelSchema {
    /// Create a new schema
    pub fn new(channels: Vec<ChannelDescriptor>) -> Self {
        Self {
            channels,
            metadata: HashMap::new(),
        }
    }

    /// Build a schema from bare channel names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(ChannelDescriptor::new).collect())
    }

    /// Get a channel by name
    pub fn channel(&self, name: &str) -> Option<&ChannelDescriptor> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Get channel index by name
    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.name == name)
    }

    /// Get channel names
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of channels
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Resolve a selector to a column index
    pub fn resolve(&self, selector: &ChannelSelector) -> IoResult<usize> {
        match selector {
            ChannelSelector::Name(name) => self
                .channel_index(name)
                .ok_or_else(|| IoError::UnknownChannel(name.clone())),
            ChannelSelector::Index(index) if *index < self.channels.len() => Ok(*index),
            ChannelSelector::Index(index) => Err(IoError::UnknownChannel(format!(
                "index {} (table has {} channels)",
                index,
                self.channels.len()
            ))),
        }
    }

    /// Resolve several selectors at once, failing on the first unknown one
    pub fn resolve_all(&self, selectors: &[ChannelSelector]) -> IoResult<Vec<usize>> {
        selectors.iter().map(|s| self.resolve(s)).collect()
    }
}

/// Descriptor for one measured channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    /// Channel name (e.g. "FSC-H", "FL1-H")
    pub name: String,

    /// Declared value range of the detector, if known
    pub range: Option<(f64, f64)>,

    /// Units of the already-transformed values (e.g. "MEFL", "a.u.")
    pub unit: Option<String>,

    /// Free-form description
    pub description: Option<String>,
}

impl ChannelDescriptor {
    /// Create a new channel descriptor
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: None,
            unit: None,
            description: None,
        }
    }

    /// Set the declared value range
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    /// Set the unit
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Label used for axes: name plus unit when known
    pub fn label(&self) -> String {
        match &self.unit {
            Some(unit) => format!("{} [{}]", self.name, unit),
            None => self.name.clone(),
        }
    }
}

/// Identifies a channel either by name or by column index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelSelector {
    Name(String),
    Index(usize),
}

impl From<&str> for ChannelSelector {
    fn from(name: &str) -> Self {
        ChannelSelector::Name(name.to_string())
    }
}

impl From<String> for ChannelSelector {
    fn from(name: String) -> Self {
        ChannelSelector::Name(name)
    }
}

impl From<usize> for ChannelSelector {
    fn from(index: usize) -> Self {
        ChannelSelector::Index(index)
    }
}

impl fmt::Display for ChannelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelSelector::Name(name) => write!(f, "{}", name),
            ChannelSelector::Index(index) => write!(f, "#{}", index),
        }
    }
}
