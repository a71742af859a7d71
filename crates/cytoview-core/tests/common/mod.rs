//! Shared event-table fixtures for integration tests

#![allow(dead_code)]

use cytoview_core::io::{ChannelDescriptor, ChannelSchema, EventTable};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// `n` readings evenly spread over `[lo, hi]`, both ends included
pub fn evenly_spaced(n: usize, lo: f64, hi: f64) -> Vec<f64> {
    (0..n)
        .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
        .collect()
}

/// Scatter/fluorescence table with two populations, values in (1, 1024)
///
/// Channels: FSC-H, SSC-H, FL1-H. The FL1-H channel declares the
/// detector range [1, 1024].
pub fn two_population_table(n: usize, seed: u64) -> EventTable {
    let schema = ChannelSchema::new(vec![
        ChannelDescriptor::new("FSC-H"),
        ChannelDescriptor::new("SSC-H"),
        ChannelDescriptor::new("FL1-H")
            .with_range(1.0, 1024.0)
            .with_unit("a.u."),
    ]);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut draw = |mean: f64, sd: f64| {
        Normal::new(mean, sd)
            .expect("fixture spreads are positive")
            .sample(&mut rng)
            .clamp(1.0, 1023.0)
    };
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|k| {
            let (fsc, ssc, fl1) = if k % 3 == 0 {
                (200.0, 150.0, 20.0)
            } else {
                (600.0, 450.0, 300.0)
            };
            vec![draw(fsc, 40.0), draw(ssc, 30.0), draw(fl1, fl1 * 0.2)]
        })
        .collect();

    EventTable::from_rows(schema, &rows).expect("fixture rows are rectangular")
}

/// Keep only the events of `table` whose FSC-H exceeds `threshold`
pub fn gate_fsc(table: &EventTable, threshold: f64) -> EventTable {
    let rows: Vec<Vec<f64>> = table
        .data()
        .rows()
        .into_iter()
        .filter(|row| row[0] > threshold)
        .map(|row| row.to_vec())
        .collect();
    EventTable::from_rows(table.schema().clone(), &rows).expect("gated rows are rectangular")
}

/// Two-channel table from paired columns
pub fn pair_table(xs: &[f64], ys: &[f64]) -> EventTable {
    let rows: Vec<Vec<f64>> = xs.iter().zip(ys).map(|(&x, &y)| vec![x, y]).collect();
    EventTable::from_rows(ChannelSchema::from_names(["x", "y"]), &rows)
        .expect("pair rows are rectangular")
}
