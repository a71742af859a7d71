//! Event table: events × channels matrix plus its channel schema

use ndarray::{Array2, ArrayView1, Axis};

use crate::reader::{IoError, IoResult};
use crate::schema::{ChannelDescriptor, ChannelSchema, ChannelSelector};

/// An immutable table of cytometry events
///
/// Rows are events, columns are channels. Values are expected to be
/// already transformed into the units the caller wants to plot.
#[derive(Debug, Clone)]
pub struct EventTable {
    schema: ChannelSchema,
    data: Array2<f64>,
}

impl EventTable {
    /// Create a table from a schema and an events × channels matrix
    pub fn new(schema: ChannelSchema, data: Array2<f64>) -> IoResult<Self> {
        if data.ncols() != schema.num_channels() {
            return Err(IoError::InvalidFormat(format!(
                "schema declares {} channels but data has {} columns",
                schema.num_channels(),
                data.ncols()
            )));
        }
        Ok(Self { schema, data })
    }

    /// Create a table from event rows
    ///
    /// Every row must have one reading per channel.
    pub fn from_rows(schema: ChannelSchema, rows: &[Vec<f64>]) -> IoResult<Self> {
        let width = schema.num_channels();
        let mut flat = Vec::with_capacity(rows.len() * width);

        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(IoError::RaggedRow {
                    row: i,
                    expected: width,
                    actual: row.len(),
                });
            }
            flat.extend_from_slice(row);
        }

        let data = Array2::from_shape_vec((rows.len(), width), flat)
            .map_err(|e| IoError::InvalidFormat(e.to_string()))?;
        Self::new(schema, data)
    }

    /// Channel schema
    pub fn schema(&self) -> &ChannelSchema {
        &self.schema
    }

    /// Number of events
    pub fn num_events(&self) -> usize {
        self.data.nrows()
    }

    /// Number of channels
    pub fn num_channels(&self) -> usize {
        self.data.ncols()
    }

    /// Check if the table has no events
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Raw events × channels matrix
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Resolve a selector to a column index
    pub fn resolve(&self, selector: &ChannelSelector) -> IoResult<usize> {
        self.schema.resolve(selector)
    }

    /// Descriptor of the selected channel
    pub fn descriptor(&self, selector: &ChannelSelector) -> IoResult<&ChannelDescriptor> {
        let index = self.resolve(selector)?;
        Ok(&self.schema.channels[index])
    }

    /// Borrow one channel's readings
    pub fn column(&self, selector: &ChannelSelector) -> IoResult<ArrayView1<'_, f64>> {
        let index = self.resolve(selector)?;
        Ok(self.data.column(index))
    }

    /// Copy one channel's readings into a contiguous vector
    pub fn column_vec(&self, selector: &ChannelSelector) -> IoResult<Vec<f64>> {
        Ok(self.column(selector)?.to_vec())
    }

    /// Build a new table holding only the selected channels, in selector order
    pub fn select(&self, selectors: &[ChannelSelector]) -> IoResult<EventTable> {
        let indices = self.schema.resolve_all(selectors)?;
        let channels = indices
            .iter()
            .map(|&i| self.schema.channels[i].clone())
            .collect();
        let mut schema = ChannelSchema::new(channels);
        schema.metadata = self.schema.metadata.clone();

        Ok(Self {
            schema,
            data: self.data.select(Axis(1), &indices),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> EventTable {
        let schema = ChannelSchema::from_names(["FSC-H", "SSC-H", "FL1-H"]);
        EventTable::from_rows(
            schema,
            &[
                vec![1.0, 10.0, 100.0],
                vec![2.0, 20.0, 200.0],
                vec![3.0, 30.0, 300.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_column_access() {
        let table = table();
        assert_eq!(table.num_events(), 3);
        assert_eq!(table.num_channels(), 3);
        assert_eq!(
            table.column_vec(&"SSC-H".into()).unwrap(),
            vec![10.0, 20.0, 30.0]
        );
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let schema = ChannelSchema::from_names(["a", "b"]);
        let result = EventTable::from_rows(schema, &[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            result,
            Err(IoError::RaggedRow { row: 1, expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_select_reorders_channels() {
        let table = table();
        let selected = table
            .select(&["FL1-H".into(), ChannelSelector::Index(0)])
            .unwrap();
        assert_eq!(selected.schema().channel_names(), vec!["FL1-H", "FSC-H"]);
        assert_eq!(selected.data()[[1, 0]], 200.0);
        assert_eq!(selected.data()[[1, 1]], 2.0);
    }

    #[test]
    fn test_unknown_channel() {
        let table = table();
        assert!(matches!(
            table.column(&"FL2-H".into()),
            Err(IoError::UnknownChannel(_))
        ));
    }
}
