//! Bin edge generation
//!
//! Edges partition a channel's value range into `n` intervals. Every bin
//! is half-open `[e[i], e[i+1])` except the last one, which is closed on
//! both ends so a reading equal to the upper bound is still counted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{StatsError, StatsResult};

/// Number of bins used when the caller does not ask for a count
pub const DEFAULT_BIN_COUNT: usize = 256;

/// Spacing of generated bin edges
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Linear,
    Log,
}

impl Scale {
    pub fn name(&self) -> &'static str {
        match self {
            Scale::Linear => "linear",
            Scale::Log => "log",
        }
    }
}

impl FromStr for Scale {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" | "lin" => Ok(Scale::Linear),
            "log" | "log10" => Ok(Scale::Log),
            _ => Err(StatsError::UnknownScale(s.to_string())),
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the caller asked for bins: a count to generate, or explicit edges
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BinSpec {
    Count(usize),
    Edges(Vec<f64>),
}

impl Default for BinSpec {
    fn default() -> Self {
        BinSpec::Count(DEFAULT_BIN_COUNT)
    }
}

impl From<usize> for BinSpec {
    fn from(count: usize) -> Self {
        BinSpec::Count(count)
    }
}

impl From<Vec<f64>> for BinSpec {
    fn from(edges: Vec<f64>) -> Self {
        BinSpec::Edges(edges)
    }
}

/// Validated, strictly increasing bin boundaries
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedEdges")]
pub struct BinEdges {
    edges: Vec<f64>,
    scale: Scale,
}

/// Wire form of [`BinEdges`], validated on the way in
#[derive(Deserialize)]
struct UncheckedEdges {
    edges: Vec<f64>,
    #[serde(default)]
    scale: Scale,
}

impl TryFrom<UncheckedEdges> for BinEdges {
    type Error = StatsError;

    fn try_from(raw: UncheckedEdges) -> StatsResult<Self> {
        Self::from_edges_with_scale(raw.edges, raw.scale)
    }
}

impl BinEdges {
    /// Generate `count` bins spanning `[min, max]`
    ///
    /// Linear edges are `min + i*(max-min)/count`; log edges are
    /// `min * (max/min)^(i/count)`. Both end points are exact.
    pub fn generate(scale: Scale, count: usize, min: f64, max: f64) -> StatsResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(StatsError::range(min, max, "bounds must be finite"));
        }
        if max <= min {
            return Err(StatsError::range(min, max, "upper bound must exceed lower bound"));
        }
        if count == 0 {
            return Err(StatsError::range(min, max, "bin count must be at least 1"));
        }

        let n = count as f64;
        let mut edges: Vec<f64> = match scale {
            Scale::Linear => {
                let step = (max - min) / n;
                (0..=count).map(|i| min + i as f64 * step).collect()
            }
            Scale::Log => {
                if min <= 0.0 {
                    return Err(StatsError::range(
                        min,
                        max,
                        "log scale requires a positive lower bound",
                    ));
                }
                // Interpolating exponents keeps decades exact (1, 10, 100, ...)
                let (lo, hi) = (min.log10(), max.log10());
                (0..=count)
                    .map(|i| 10f64.powf(lo + (hi - lo) * i as f64 / n))
                    .collect()
            }
        };
        edges[0] = min;
        edges[count] = max;

        if !is_strictly_increasing(&edges) {
            return Err(StatsError::range(
                min,
                max,
                format!("range too narrow to hold {} distinct bins", count),
            ));
        }

        tracing::debug!(%scale, count, min, max, "generated bin edges");
        Ok(Self { edges, scale })
    }

    /// Generate with the default bin count
    pub fn generate_default(scale: Scale, min: f64, max: f64) -> StatsResult<Self> {
        Self::generate(scale, DEFAULT_BIN_COUNT, min, max)
    }

    /// Accept caller-supplied edges after validation, unchanged
    pub fn from_edges(edges: Vec<f64>) -> StatsResult<Self> {
        Self::from_edges_with_scale(edges, Scale::Linear)
    }

    /// Accept caller-supplied edges, recording the axis scale they are meant for
    pub fn from_edges_with_scale(edges: Vec<f64>, scale: Scale) -> StatsResult<Self> {
        if edges.len() < 2 {
            return Err(StatsError::InvalidEdges(format!(
                "need at least 2 edges, got {}",
                edges.len()
            )));
        }
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(StatsError::InvalidEdges("edges must be finite".to_string()));
        }
        if !is_strictly_increasing(&edges) {
            return Err(StatsError::InvalidEdges(
                "edges must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { edges, scale })
    }

    /// Resolve a `BinSpec` against a value range
    ///
    /// Explicit edges bypass the range entirely.
    pub fn resolve(spec: &BinSpec, scale: Scale, min: f64, max: f64) -> StatsResult<Self> {
        match spec {
            BinSpec::Count(count) => Self::generate(scale, *count, min, max),
            BinSpec::Edges(edges) => Self::from_edges_with_scale(edges.clone(), scale),
        }
    }

    /// Boundaries as a slice (length `n_bins() + 1`)
    pub fn as_slice(&self) -> &[f64] {
        &self.edges
    }

    /// Scale these edges were generated for
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Number of bins
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Lower bound of the first bin
    pub fn first(&self) -> f64 {
        self.edges[0]
    }

    /// Upper bound of the last bin
    pub fn last(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Check if a value falls inside the binned range
    pub fn contains(&self, value: f64) -> bool {
        value >= self.first() && value <= self.last()
    }

    /// Index of the bin holding `value`, or `None` when out of range
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || !self.contains(value) {
            return None;
        }
        if value == self.last() {
            return Some(self.n_bins() - 1);
        }
        // First edge strictly greater than value, minus one
        Some(self.edges.partition_point(|&e| e <= value) - 1)
    }

    /// Width of bin `i`
    pub fn width(&self, i: usize) -> f64 {
        self.edges[i + 1] - self.edges[i]
    }

    /// Widths of all bins
    pub fn widths(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Bin centers; geometric under a log scale
    pub fn centers(&self) -> Vec<f64> {
        self.edges
            .windows(2)
            .map(|w| match self.scale {
                Scale::Log if w[0] > 0.0 => (w[0] * w[1]).sqrt(),
                _ => (w[0] + w[1]) / 2.0,
            })
            .collect()
    }
}

fn is_strictly_increasing(edges: &[f64]) -> bool {
    edges.windows(2).all(|w| w[0] < w[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() <= 1e-9 * e.abs().max(1.0), "{} != {}", a, e);
        }
    }

    #[test]
    fn test_linear_edges() {
        let edges = BinEdges::generate(Scale::Linear, 10, 1.0, 100.0).unwrap();
        assert_eq!(edges.n_bins(), 10);
        assert_close(
            edges.as_slice(),
            &[1.0, 10.9, 20.8, 30.7, 40.6, 50.5, 60.4, 70.3, 80.2, 90.1, 100.0],
        );
        for w in edges.widths() {
            assert!((w - 9.9).abs() < 1e-9);
        }
    }

    #[test]
    fn test_log_edges_decades() {
        let edges = BinEdges::generate(Scale::Log, 3, 1.0, 1000.0).unwrap();
        assert_close(edges.as_slice(), &[1.0, 10.0, 100.0, 1000.0]);
        assert_eq!(edges.first(), 1.0);
        assert_eq!(edges.last(), 1000.0);
    }

    #[test]
    fn test_default_count() {
        let edges = BinEdges::generate_default(Scale::Linear, 0.0, 1.0).unwrap();
        assert_eq!(edges.n_bins(), DEFAULT_BIN_COUNT);
        assert_eq!(BinSpec::default(), BinSpec::Count(256));
    }

    #[rstest]
    #[case(Scale::Linear, 5.0, 5.0)]
    #[case(Scale::Linear, 5.0, 1.0)]
    #[case(Scale::Log, 0.0, 10.0)]
    #[case(Scale::Log, -1.0, 10.0)]
    #[case(Scale::Linear, f64::NAN, 10.0)]
    fn test_invalid_ranges(#[case] scale: Scale, #[case] min: f64, #[case] max: f64) {
        assert!(matches!(
            BinEdges::generate(scale, 4, min, max),
            Err(StatsError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(BinEdges::generate(Scale::Linear, 0, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_explicit_edges_unchanged() {
        let raw = vec![0.0, 0.5, 2.0, 10.0];
        let edges = BinEdges::from_edges(raw.clone()).unwrap();
        assert_eq!(edges.as_slice(), raw.as_slice());

        let resolved = BinEdges::resolve(&BinSpec::Edges(raw.clone()), Scale::Log, 99.0, 1.0);
        assert_eq!(resolved.unwrap().as_slice(), raw.as_slice());
    }

    #[test]
    fn test_deserialized_edges_are_validated() {
        let edges = BinEdges::from_edges_with_scale(vec![1.0, 10.0, 100.0], Scale::Log).unwrap();
        let json = serde_json::to_string(&edges).unwrap();
        let back: BinEdges = serde_json::from_str(&json).unwrap();
        assert_eq!(back, edges);

        let unordered = r#"{"edges":[0.0,2.0,1.0],"scale":"linear"}"#;
        assert!(serde_json::from_str::<BinEdges>(unordered).is_err());
        assert!(serde_json::from_str::<BinEdges>(r#"{"edges":[1.0]}"#).is_err());
    }

    #[rstest]
    #[case(vec![1.0])]
    #[case(vec![])]
    #[case(vec![0.0, 1.0, 1.0])]
    #[case(vec![2.0, 1.0])]
    #[case(vec![0.0, f64::INFINITY])]
    fn test_explicit_edges_rejected(#[case] raw: Vec<f64>) {
        assert!(matches!(
            BinEdges::from_edges(raw),
            Err(StatsError::InvalidEdges(_))
        ));
    }

    #[test]
    fn test_bin_index_closed_last_bin() {
        let edges = BinEdges::from_edges(vec![1.0, 5.5, 10.0]).unwrap();
        assert_eq!(edges.bin_index(1.0), Some(0));
        assert_eq!(edges.bin_index(5.49), Some(0));
        assert_eq!(edges.bin_index(5.5), Some(1));
        assert_eq!(edges.bin_index(10.0), Some(1));
        assert_eq!(edges.bin_index(10.0001), None);
        assert_eq!(edges.bin_index(0.999), None);
        assert_eq!(edges.bin_index(f64::NAN), None);
    }

    #[test]
    fn test_log_centers_are_geometric() {
        let edges = BinEdges::generate(Scale::Log, 2, 1.0, 100.0).unwrap();
        let centers = edges.centers();
        assert!((centers[0] - 10f64.sqrt()).abs() < 1e-9);
        assert!((centers[1] - 1000f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_scale_parsing() {
        assert_eq!("LOG".parse::<Scale>().unwrap(), Scale::Log);
        assert_eq!("linear".parse::<Scale>().unwrap(), Scale::Linear);
        assert!(matches!(
            "logicle".parse::<Scale>(),
            Err(StatsError::UnknownScale(_))
        ));
    }
}
