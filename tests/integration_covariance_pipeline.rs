//! Integration tests for the covariance calculator.
//!
//! Purpose
//! -------
//! - Validate the end-to-end retrieval-analysis flow: from a (possibly
//!   masked) altitude grid, through assumed and a-priori covariances, to
//!   type-1 / type-2 kernels and smoothing errors.
//! - Use a realistic level count and smooth synthetic averaging kernels
//!   rather than toy 1×1 cases only.
//!
//! Coverage
//! --------
//! - `covariance::altitude::AltitudeGrid` construction with and without mask.
//! - `covariance::calculator::Covariance`:
//!   - `traf`, `traf_inverse`, `apriori_covariance`,
//!   - `type1_of`, `type1_inverse_of`, `c_by_avk`, `type2_of`,
//!   - `smoothing_error` with default and custom options.
//! - `covariance::options` conversion from raw species counts.
//!
//! Exclusions
//! ----------
//! - Python bindings, which are exercised from Python.
//! - Block-level layout checks, covered by unit tests.
use approx::assert_abs_diff_eq;
use iasi_covariance::covariance::prelude::*;
use ndarray::{Array2, s};

const TOL: f64 = 1e-9;

/// Purpose
/// -------
/// 29 levels from the surface to ~30 km, denser near the ground, similar to
/// the vertical grid of thermal-infrared water-vapour products.
fn retrieval_grid() -> Vec<f64> {
    (0..29).map(|i| 40.0 * (i as f64).powi(2) + 100.0 * i as f64).collect()
}

/// Purpose
/// -------
/// Smooth synthetic averaging kernel for one species:
/// Gaussian in level index with width `width`, scaled by `gain`.
fn synthetic_kernel(nol: usize, width: f64, gain: f64) -> Array2<f64> {
    Array2::from_shape_fn((nol, nol), |(i, j)| {
        let d = i as f64 - j as f64;
        let norm = width * (2.0 * std::f64::consts::PI).sqrt();
        gain * (-(d * d) / (2.0 * width * width)).exp() / norm
    })
}

/// Purpose
/// -------
/// Natural-basis `{ln[H2O], ln[HDO]}` averaging kernel with a small
/// cross-species sensitivity in both off-diagonal blocks.
fn natural_avk(nol: usize) -> Array2<f64> {
    let mut avk = Array2::<f64>::zeros((2 * nol, 2 * nol));
    avk.slice_mut(s![..nol, ..nol]).assign(&synthetic_kernel(nol, 2.0, 0.9));
    avk.slice_mut(s![nol.., nol..]).assign(&synthetic_kernel(nol, 2.5, 0.8));
    avk.slice_mut(s![..nol, nol..]).assign(&synthetic_kernel(nol, 3.0, 0.05));
    avk.slice_mut(s![nol.., ..nol]).assign(&synthetic_kernel(nol, 3.0, 0.07));
    avk
}

fn assert_matrices_close(a: &Array2<f64>, b: &Array2<f64>, tol: f64) {
    assert_eq!(a.shape(), b.shape());
    for (x, y) in a.iter().zip(b.iter()) {
        assert_abs_diff_eq!(*x, *y, epsilon = tol);
    }
}

#[test]
// Purpose
// -------
// Run the full analysis chain on a 29-level grid and check the structural
// properties every stage must satisfy.
//
// Given
// -----
// - A 29-level grid and a natural-basis averaging kernel with cross-species
//   terms.
//
// Expect
// ------
// - `P⁻¹ P = I` and `Sa` symmetric.
// - The type-1 kernel round-trips back to the natural basis.
// - `type2_of(A) == c_by_avk(A) · type1_of(A)`.
// - The smoothing error is symmetric with a non-negative diagonal.
fn full_pipeline_on_retrieval_grid() {
    // Arrange
    let alt = retrieval_grid();
    let nol = alt.len();
    let cov = Covariance::from_altitudes(nol, &alt).expect("finite grid should be accepted");
    let avk = natural_avk(nol);

    // Act
    let p = cov.traf();
    let p_inv = cov.traf_inverse().unwrap();
    let sa = cov.apriori_covariance().unwrap();
    let a1 = cov.type1_of(&avk).unwrap();
    let back = cov.type1_inverse_of(&a1).unwrap();
    let c = cov.c_by_avk(&avk).unwrap();
    let a2 = cov.type2_of(&avk).unwrap();
    let s_err = cov.smoothing_error(&a2, &a1, &AssumedOptions::default()).unwrap();

    // Assert
    assert_matrices_close(&p_inv.dot(&p), &Array2::eye(2 * nol), TOL);
    assert_matrices_close(&sa, &sa.t().to_owned(), TOL);
    assert_matrices_close(&back, &avk, TOL);
    assert_matrices_close(&a2, &c.dot(&a1), TOL);
    assert_eq!(s_err.dim(), (2 * nol, 2 * nol));
    assert_matrices_close(&s_err, &s_err.t().to_owned(), TOL);
    for i in 0..2 * nol {
        assert!(s_err[[i, i]] >= -TOL, "negative variance {} at {i}", s_err[[i, i]]);
    }
}

#[test]
// Purpose
// -------
// Verify that the natural-basis a-priori carries the expected H2O/HDO
// structure implied by the decorrelated prior.
//
// Given
// -----
// - Default options (w1 = 1, w2 = 0.01) on the retrieval grid.
//
// Expect
// ------
// - With `K` the Gaussian kernel: `Sa[H2O,H2O] = (w1 + w2/4) K`,
//   `Sa[H2O,HDO] = (w1 − w2/4) K`, `Sa[HDO,HDO] = (w1 + w2/4) K`.
fn apriori_covariance_matches_block_closed_form() {
    // Arrange
    let alt = retrieval_grid();
    let nol = alt.len();
    let cov = Covariance::from_altitudes(nol, &alt).unwrap();
    let grid = AltitudeGrid::from_values(&alt).unwrap();
    let k = iasi_covariance::covariance::correlation_matrix(&grid, 2500.0);

    // Act
    let sa = cov.apriori_covariance().unwrap();

    // Assert
    let diag = &k * (1.0 + 0.01 / 4.0);
    let cross = &k * (1.0 - 0.01 / 4.0);
    assert_matrices_close(&sa.slice(s![..nol, ..nol]).to_owned(), &diag, TOL);
    assert_matrices_close(&sa.slice(s![nol.., nol..]).to_owned(), &diag, TOL);
    assert_matrices_close(&sa.slice(s![..nol, nol..]).to_owned(), &cross, TOL);
    assert_matrices_close(&sa.slice(s![nol.., ..nol]).to_owned(), &cross, TOL);
}

#[test]
// Purpose
// -------
// Check that a perfect instrument (identity kernel) has no smoothing error
// and that an imperfect one has a strictly positive trace.
//
// Given
// -----
// - Identity kernel vs. identity, and the synthetic type-2 kernel vs. identity.
//
// Expect
// ------
// - Zero matrix for the first; positive trace for the second.
fn smoothing_error_against_ideal_operator() {
    // Arrange
    let alt = retrieval_grid();
    let nol = alt.len();
    let cov = Covariance::from_altitudes(nol, &alt).unwrap();
    let eye = Array2::<f64>::eye(2 * nol);
    let a2 = cov.type2_of(&natural_avk(nol)).unwrap();

    // Act
    let perfect = cov.smoothing_error(&eye, &eye, &AssumedOptions::default()).unwrap();
    let realistic = cov.smoothing_error(&a2, &eye, &AssumedOptions::default()).unwrap();

    // Assert
    assert!(perfect.iter().all(|&v| v == 0.0));
    assert!(realistic.diag().sum() > 0.0);
}

#[test]
// Purpose
// -------
// Exercise single-species smoothing errors with custom weights built from a
// raw species count.
//
// Given
// -----
// - The H2O block of the synthetic kernel, species = 1, w1 = 0.5, L = 5000.
//
// Expect
// ------
// - `nol × nol` result equal to `(A − I) · 0.5 K · (A − I)ᵀ`.
fn single_species_smoothing_error_with_custom_options() {
    // Arrange
    let alt = retrieval_grid();
    let nol = alt.len();
    let cov = Covariance::from_altitudes(nol, &alt).unwrap();
    let opts = AssumedOptions::new(1, 0.5, 0.0, 5000.0).unwrap();
    let a = synthetic_kernel(nol, 2.0, 0.9);
    let eye = Array2::<f64>::eye(nol);

    // Act
    let s_err = cov.smoothing_error(&a, &eye, &opts).unwrap();

    // Assert
    let grid = AltitudeGrid::from_values(&alt).unwrap();
    let k = iasi_covariance::covariance::correlation_matrix(&grid, 5000.0) * 0.5;
    let diff = &a - &eye;
    let expected = diff.dot(&k).dot(&diff.t());
    assert_eq!(s_err.dim(), (nol, nol));
    assert_matrices_close(&s_err, &expected, TOL);
}

#[test]
// Purpose
// -------
// Ensure that a masked level contaminates exactly its own rows and columns
// of `Sa'`, and that the contamination is visible in the natural-basis `Sa`.
//
// Given
// -----
// - The retrieval grid with level 5 masked, default options.
//
// Expect
// ------
// - `Sa'` entries touching level 5 (or 5 + nol) inside the diagonal blocks
//   are NaN; all other `Sa'` entries are finite.
// - `Sa` entries touching level 5 are NaN as well. Dense products spread
//   NaN further (`0 · NaN = NaN`), so nothing else is asserted about `Sa`.
fn masked_level_propagates_nan() {
    // Arrange
    let alt = retrieval_grid();
    let nol = alt.len();
    let mask: Vec<bool> = (0..nol).map(|i| i == 5).collect();
    let grid = AltitudeGrid::from_masked(&alt, &mask).unwrap();
    let cov = Covariance::new(nol, grid).unwrap();

    // Act
    let sa_traf = cov.assumed_covariance(&AssumedOptions::default());
    let sa = cov.apriori_covariance().unwrap();

    // Assert
    let touched = |i: usize| i % nol == 5;
    let same_block = |i: usize, j: usize| (i < nol) == (j < nol);
    for ((i, j), &v) in sa_traf.indexed_iter() {
        if same_block(i, j) && (touched(i) || touched(j)) {
            assert!(v.is_nan(), "expected NaN at ({i}, {j}), got {v}");
        } else {
            assert!(v.is_finite(), "expected finite at ({i}, {j}), got {v}");
        }
    }
    for i in 0..2 * nol {
        assert!(sa[[5, i]].is_nan());
        assert!(sa[[i, 5 + nol]].is_nan());
    }
}

#[test]
// Purpose
// -------
// Confirm the error taxonomy at the public surface.
//
// Given
// -----
// - species = 3, a kernel sized for the wrong grid, and a level-count
//   mismatch at construction.
//
// Expect
// ------
// - Invalid-argument, dimension-mismatch, and invalid-argument errors.
fn public_surface_reports_error_classes() {
    // Arrange
    let alt = retrieval_grid();
    let nol = alt.len();
    let cov = Covariance::from_altitudes(nol, &alt).unwrap();

    // Act
    let bad_species = Species::try_from(3_usize);
    let bad_shape = cov.type2_of(&Array2::<f64>::eye(nol));
    let bad_grid = Covariance::from_altitudes(nol + 1, &alt);

    // Assert
    assert!(bad_species.unwrap_err().is_invalid_argument());
    assert!(bad_shape.unwrap_err().is_dimension_mismatch());
    assert!(matches!(bad_grid, Err(CovError::LevelCountMismatch { .. })));
}
