//! Separable Gaussian smoothing of 2D frequency grids
//!
//! The grid is convolved with a 1D Gaussian along the x axis (axis 0) and
//! then along the y axis (axis 1). Cells beyond the grid boundary are
//! treated as zero: mass that spreads past the edge is dropped, and the
//! output keeps the input's shape.

use ndarray::{Array2, ArrayView1, ArrayViewMut1, Axis, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

/// Default blur, in bins per bin of grid resolution (10 bins on a 1024 grid)
pub const DEFAULT_SIGMA_PER_BIN: f64 = 10.0 / 1024.0;

/// Kernel half-width in units of sigma
pub const DEFAULT_TRUNCATE: f64 = 4.0;

/// Default sigma, in bins, for an axis with `n_bins` bins
pub fn default_sigma(n_bins: usize) -> f64 {
    DEFAULT_SIGMA_PER_BIN * n_bins as f64
}

/// Widths past this many bins normalize against the Gaussian integral
/// instead of summing every tap
const EXACT_SUPPORT_LIMIT: f64 = 65_536.0;

/// Normalized, symmetric Gaussian kernel truncated at `truncate * sigma`
///
/// At most `max_radius` taps are stored on each side of the centre, but the
/// weights are normalized over the full truncated support. Under zero
/// padding a lane of `n` cells never reaches taps past `n - 1`, so capping
/// the radius there keeps the same mass semantics. A support narrower than
/// one bin (including `sigma == 0`) yields the identity kernel `[1.0]`.
pub fn gaussian_kernel(sigma: f64, truncate: f64, max_radius: usize) -> Vec<f64> {
    let reach = (truncate * sigma + 0.5).floor();
    if !(reach >= 1.0) {
        return vec![1.0];
    }

    let tap = |k: usize| {
        let u = k as f64 / sigma;
        (-0.5 * u * u).exp()
    };
    let radius = if reach > max_radius as f64 {
        max_radius
    } else {
        reach as usize
    };
    let mut kernel: Vec<f64> = (0..=2 * radius).map(|i| tap(i.abs_diff(radius))).collect();

    let stored: f64 = kernel.iter().sum();
    let total = if radius as f64 == reach {
        stored
    } else if reach <= EXACT_SUPPORT_LIMIT {
        stored + 2.0 * (radius + 1..=reach as usize).map(&tap).sum::<f64>()
    } else {
        // Each unit cell integrates to its tap within 1/(24 sigma^2)
        sigma * gaussian_integral(truncate + 0.5 / sigma)
    };

    kernel.iter_mut().for_each(|w| *w /= total);
    kernel
}

/// Integral of `exp(-u^2 / 2)` over `[-t, t]` (composite Simpson)
fn gaussian_integral(t: f64) -> f64 {
    const STEPS: usize = 1024;
    let h = t / STEPS as f64;
    let f = |u: f64| (-0.5 * u * u).exp();
    let inner: f64 = (1..STEPS)
        .map(|i| {
            let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
            weight * f(i as f64 * h)
        })
        .sum();
    2.0 * h / 3.0 * (f(0.0) + inner + f(t))
}

/// Smoothing request carried alongside a 2D histogram computation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmoothingOptions {
    /// Apply the Gaussian filter at all
    pub enabled: bool,
    /// Sigma in bins for both axes; `None` derives it from the bin counts
    pub sigma: Option<f64>,
    /// Kernel half-width in units of sigma
    pub truncate: f64,
}

impl SmoothingOptions {
    /// Smoothing switched off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Smoothing with an explicit sigma
    pub fn with_sigma(sigma: f64) -> Self {
        Self {
            sigma: Some(sigma),
            ..Self::default()
        }
    }

    /// Build the smoother for a grid of `nx` × `ny` bins
    pub fn smoother_for(&self, nx: usize, ny: usize) -> StatsResult<GaussianSmoother> {
        let smoother = match self.sigma {
            Some(sigma) => GaussianSmoother::uniform(sigma)?,
            None => GaussianSmoother::for_grid(nx, ny),
        };
        smoother.with_truncate(self.truncate)
    }
}

impl Default for SmoothingOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            sigma: None,
            truncate: DEFAULT_TRUNCATE,
        }
    }
}

/// Separable Gaussian filter with per-axis widths, in bins
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GaussianSmoother {
    sigma_x: f64,
    sigma_y: f64,
    truncate: f64,
}

impl GaussianSmoother {
    /// Create a smoother with separate widths along x and y
    pub fn new(sigma_x: f64, sigma_y: f64) -> StatsResult<Self> {
        for sigma in [sigma_x, sigma_y] {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(StatsError::InvalidSigma(sigma));
            }
        }
        Ok(Self {
            sigma_x,
            sigma_y,
            truncate: DEFAULT_TRUNCATE,
        })
    }

    /// Create a smoother with the same width on both axes
    pub fn uniform(sigma: f64) -> StatsResult<Self> {
        Self::new(sigma, sigma)
    }

    /// Default widths derived from the grid resolution
    pub fn for_grid(nx: usize, ny: usize) -> Self {
        Self {
            sigma_x: default_sigma(nx),
            sigma_y: default_sigma(ny),
            truncate: DEFAULT_TRUNCATE,
        }
    }

    /// Change the kernel half-width (in units of sigma)
    pub fn with_truncate(mut self, truncate: f64) -> StatsResult<Self> {
        if !truncate.is_finite() || truncate <= 0.0 {
            return Err(StatsError::InvalidSigma(truncate));
        }
        self.truncate = truncate;
        Ok(self)
    }

    pub fn sigma_x(&self) -> f64 {
        self.sigma_x
    }

    pub fn sigma_y(&self) -> f64 {
        self.sigma_y
    }

    /// Smooth a grid indexed `[x_bin][y_bin]`
    pub fn smooth(&self, grid: &Array2<f64>) -> Array2<f64> {
        if grid.is_empty() {
            tracing::warn!("smoothing requested on an empty grid");
            return grid.clone();
        }

        let (nx, ny) = grid.dim();
        let kernel_x = gaussian_kernel(self.sigma_x, self.truncate, nx - 1);
        let kernel_y = gaussian_kernel(self.sigma_y, self.truncate, ny - 1);

        let along_x = convolve_axis(grid, &kernel_x, Axis(0));
        convolve_axis(&along_x, &kernel_y, Axis(1))
    }
}

fn convolve_axis(grid: &Array2<f64>, kernel: &[f64], axis: Axis) -> Array2<f64> {
    let mut out = Array2::zeros(grid.raw_dim());
    Zip::from(out.lanes_mut(axis))
        .and(grid.lanes(axis))
        .for_each(|out_lane, in_lane| convolve_lane(in_lane, out_lane, kernel));
    out
}

fn convolve_lane(input: ArrayView1<f64>, mut output: ArrayViewMut1<f64>, kernel: &[f64]) {
    let n = input.len() as isize;
    let radius = (kernel.len() / 2) as isize;

    for i in 0..n {
        let lo = (i - radius).max(0);
        let hi = (i + radius).min(n - 1);
        let mut acc = 0.0;
        for j in lo..=hi {
            acc += kernel[(j - i + radius) as usize] * input[j as usize];
        }
        output[i as usize] = acc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_kernel_normalized_and_symmetric() {
        let kernel = gaussian_kernel(2.0, 4.0, usize::MAX);
        assert_eq!(kernel.len(), 17);
        assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        for i in 0..kernel.len() / 2 {
            assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-15);
        }
        assert!(kernel[8] > kernel[7]);
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        let grid = array![[1.0, 2.0], [3.0, 4.0]];
        let smoothed = GaussianSmoother::uniform(0.0).unwrap().smooth(&grid);
        assert_eq!(smoothed, grid);
    }

    #[test]
    fn test_shape_preserved() {
        let grid = Array2::from_elem((5, 9), 1.0);
        let smoothed = GaussianSmoother::new(1.5, 0.5).unwrap().smooth(&grid);
        assert_eq!(smoothed.dim(), (5, 9));
    }

    #[test]
    fn test_interior_mass_preserved() {
        let mut grid = Array2::zeros((41, 41));
        grid[[20, 20]] = 100.0;
        grid[[18, 22]] = 7.0;

        let smoothed = GaussianSmoother::uniform(2.0).unwrap().smooth(&grid);
        let mass: f64 = smoothed.sum();
        assert!((mass - 107.0).abs() / 107.0 < 1e-9);
        assert!(smoothed.iter().all(|&v| v >= 0.0));
        // Peak spreads out but stays the maximum
        assert!(smoothed[[20, 20]] < 100.0);
        assert!(smoothed[[20, 20]] >= smoothed[[19, 20]]);
    }

    #[test]
    fn test_zero_padding_drops_edge_mass() {
        let mut grid = Array2::zeros((11, 11));
        grid[[0, 0]] = 1.0;

        let smoothed = GaussianSmoother::uniform(1.0).unwrap().smooth(&grid);
        let mass: f64 = smoothed.sum();
        // Roughly three quarters of the kernel falls outside the corner
        assert!(mass < 0.5);
        assert!(mass > 0.2);
    }

    #[test]
    fn test_separable_matches_direct_convolution() {
        let grid = array![
            [0.0, 1.0, 0.0, 2.0],
            [3.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 5.0, 1.0],
        ];
        let smoother = GaussianSmoother::new(0.8, 1.2).unwrap();
        let separable = smoother.smooth(&grid);

        let kx = gaussian_kernel(0.8, DEFAULT_TRUNCATE, usize::MAX);
        let ky = gaussian_kernel(1.2, DEFAULT_TRUNCATE, usize::MAX);
        let (rx, ry) = ((kx.len() / 2) as isize, (ky.len() / 2) as isize);
        let (nx, ny) = (grid.nrows() as isize, grid.ncols() as isize);

        for i in 0..nx {
            for j in 0..ny {
                let mut direct = 0.0;
                for a in -rx..=rx {
                    for b in -ry..=ry {
                        let (x, y) = (i + a, j + b);
                        if x >= 0 && x < nx && y >= 0 && y < ny {
                            direct += kx[(a + rx) as usize]
                                * ky[(b + ry) as usize]
                                * grid[[x as usize, y as usize]];
                        }
                    }
                }
                assert!((separable[[i as usize, j as usize]] - direct).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_capped_kernel_matches_full_kernel() {
        let full = gaussian_kernel(3.0, 4.0, usize::MAX);
        assert_eq!(full.len(), 25);

        let capped = gaussian_kernel(3.0, 4.0, 2);
        assert_eq!(capped.len(), 5);
        for (c, f) in capped.iter().zip(&full[10..15]) {
            assert!((c - f).abs() < 1e-15);
        }
    }

    #[test]
    fn test_wide_kernel_uses_gaussian_integral() {
        let sigma = 1e5;
        let kernel = gaussian_kernel(sigma, 4.0, 3);
        assert_eq!(kernel.len(), 7);

        // Centre tap is 1 / (sqrt(2 pi) sigma erf(4 / sqrt 2))
        let expected = 1.0 / ((2.0 * std::f64::consts::PI).sqrt() * sigma * 0.999_936_657_5);
        assert!((kernel[3] - expected).abs() / expected < 1e-6);
    }

    #[test]
    fn test_vanishing_sigma_is_identity() {
        let grid = array![
            [1.0, 0.0, 2.0, 0.0],
            [0.0, 3.0, 0.0, 0.0],
            [0.0, 0.0, 4.0, 5.0],
            [6.0, 0.0, 0.0, 7.0],
        ];
        let smoothed = GaussianSmoother::uniform(1e-200).unwrap().smooth(&grid);
        assert_eq!(smoothed, grid);
        assert_eq!(gaussian_kernel(1e-200, DEFAULT_TRUNCATE, usize::MAX), vec![1.0]);
    }

    #[test]
    fn test_enormous_sigma_spreads_mass_past_the_edges() {
        let grid = Array2::from_elem((4, 4), 10.0);
        for sigma in [1e9, 1e18, f64::MAX] {
            let smoothed = GaussianSmoother::uniform(sigma).unwrap().smooth(&grid);
            assert_eq!(smoothed.dim(), (4, 4));
            assert!(smoothed.iter().all(|v| v.is_finite() && *v >= 0.0));
            assert!(smoothed.sum() < 1e-6);
        }
    }

    #[test]
    fn test_invalid_sigma() {
        assert!(matches!(
            GaussianSmoother::uniform(-1.0),
            Err(StatsError::InvalidSigma(_))
        ));
        assert!(GaussianSmoother::uniform(f64::NAN).is_err());
        assert!(GaussianSmoother::uniform(1.0).unwrap().with_truncate(0.0).is_err());
    }

    #[test]
    fn test_default_sigma_scales_with_bins() {
        assert!((default_sigma(1024) - 10.0).abs() < 1e-12);
        assert!((default_sigma(256) - 2.5).abs() < 1e-12);

        let smoother = SmoothingOptions::default().smoother_for(256, 512).unwrap();
        assert!((smoother.sigma_x() - 2.5).abs() < 1e-12);
        assert!((smoother.sigma_y() - 5.0).abs() < 1e-12);

        let smoother = SmoothingOptions::with_sigma(3.0).smoother_for(256, 512).unwrap();
        assert_eq!(smoother.sigma_x(), 3.0);
        assert_eq!(smoother.sigma_y(), 3.0);
    }
}
