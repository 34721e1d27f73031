//! Gaussian altitude kernel for assumed covariances.
//!
//! Provides the scalar Gaussian `g(x; μ, σ) = exp(-(x-μ)² / (2σ²))` and the
//! `nol × nol` correlation matrix `K[i, j] = g(alt[i]; alt[j], L)` built from
//! an [`AltitudeGrid`] and a correlation length `L`.
//!
//! Conventions:
//! - No guarding on `σ`: `σ = 0` gives NaN on the diagonal (`0/0`) and `0.0`
//!   off it (`exp(-∞)`), following IEEE-754.
//! - Masked levels enter as NaN, so every entry in their row and column is NaN.
use crate::covariance::altitude::AltitudeGrid;
use ndarray::Array2;

/// Gaussian function `exp(-(x-mu)² / (2·sig²))` (unnormalized).
///
/// # Arguments
/// - `x`: evaluation point.
/// - `mu`: center of the Gaussian.
/// - `sig`: width (standard deviation).
///
/// # Returns
/// Value in `[0, 1]` for finite inputs with `sig != 0`; exactly `1.0` at
/// `x == mu`.
pub fn gaussian(x: f64, mu: f64, sig: f64) -> f64 {
    (-((x - mu) * (x - mu)) / (2.0 * sig * sig)).exp()
}

/// Level-to-level Gaussian correlation matrix for the given grid.
///
/// # Returns
/// Symmetric `n×n` matrix with `n = grid.len()`, unit diagonal for unmasked
/// levels when `correlation_length != 0`.
pub fn correlation_matrix(grid: &AltitudeGrid, correlation_length: f64) -> Array2<f64> {
    let n = grid.len();
    Array2::from_shape_fn((n, n), |(i, j)| {
        gaussian(grid.value_or_nan(i), grid.value_or_nan(j), correlation_length)
    })
}
