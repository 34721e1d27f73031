//! covariance::linalg — shape guards and the `ndarray` ↔ `nalgebra` bridge.
//!
//! Purpose
//! -------
//! Keep all dense matrices in `ndarray::Array2<f64>` while delegating matrix
//! inversion to `nalgebra`. This module owns the copy into and out of
//! `DMatrix<f64>` and the shape checks every public operation runs before it
//! multiplies.
//!
//! Key behaviors
//! -------------
//! - [`ensure_square`] and [`ensure_shape`] turn shape problems into
//!   `CovError::NotSquare` / `CovError::DimensionMismatch` tagged with the
//!   calling operation.
//! - [`checked_dot`] verifies inner dimensions before `ndarray::dot`, which
//!   would otherwise panic.
//! - [`invert`] copies into a `DMatrix`, inverts through `try_inverse` (LU with
//!   partial pivoting), and copies back; failure is `CovError::SingularMatrix`.
//!
//! Conventions
//! -----------
//! - `op` arguments name the public operation for error messages.
//! - No symmetrization is performed anywhere in this module.
use crate::covariance::errors::{CovError, CovResult};
use nalgebra::DMatrix;
use ndarray::{Array2, ArrayView2};

/// Shape of a 2-D view as `(rows, cols)`.
pub fn shape_of(matrix: ArrayView2<'_, f64>) -> (usize, usize) {
    (matrix.nrows(), matrix.ncols())
}

/// Require a square matrix and return its dimension.
pub fn ensure_square(op: &'static str, matrix: ArrayView2<'_, f64>) -> CovResult<usize> {
    let shape = shape_of(matrix);
    if shape.0 != shape.1 {
        return Err(CovError::NotSquare { op, shape });
    }
    Ok(shape.0)
}

/// Require an exact shape.
pub fn ensure_shape(
    op: &'static str, matrix: ArrayView2<'_, f64>, expected: (usize, usize),
) -> CovResult<()> {
    let found = shape_of(matrix);
    if found != expected {
        return Err(CovError::DimensionMismatch { op, expected, found });
    }
    Ok(())
}

/// Matrix product `a · b` with an inner-dimension check.
///
/// Errors
/// ------
/// - `CovError::DimensionMismatch` when `a.ncols() != b.nrows()`; `expected`
///   reports the shape `b` would need.
pub fn checked_dot(
    op: &'static str, a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>,
) -> CovResult<Array2<f64>> {
    if a.ncols() != b.nrows() {
        return Err(CovError::DimensionMismatch {
            op,
            expected: (a.ncols(), b.ncols()),
            found: shape_of(b),
        });
    }
    Ok(a.dot(&b))
}

/// Inverse of a square matrix via `nalgebra`.
///
/// Errors
/// ------
/// - `CovError::NotSquare` for non-square input.
/// - `CovError::SingularMatrix` when LU factorization hits a zero pivot, or
///   the computed inverse contains non-finite entries.
pub fn invert(op: &'static str, matrix: ArrayView2<'_, f64>) -> CovResult<Array2<f64>> {
    let n = ensure_square(op, matrix)?;
    let mut dense = DMatrix::<f64>::zeros(n, n);
    fill_dmatrix(matrix, &mut dense);
    let inverse = dense.try_inverse().ok_or(CovError::SingularMatrix { op, dim: n })?;
    if inverse.iter().any(|v| !v.is_finite()) {
        return Err(CovError::SingularMatrix { op, dim: n });
    }
    Ok(from_dmatrix(&inverse))
}

/// Copy an `ndarray` view into a preallocated `DMatrix` of the same shape.
///
/// Walks column by column to match the column-major storage of `DMatrix`.
/// Panics on shape mismatch; callers size `target` from `source`.
fn fill_dmatrix(source: ArrayView2<'_, f64>, target: &mut DMatrix<f64>) {
    for j in 0..source.ncols() {
        for i in 0..source.nrows() {
            target[(i, j)] = source[[i, j]];
        }
    }
}

fn from_dmatrix(source: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((source.nrows(), source.ncols()), |(i, j)| source[(i, j)])
}
