//! covariance::calculator — the `Covariance` calculator for {H2O, HDO} states.
//!
//! Purpose
//! -------
//! Build assumed a-priori covariances over an altitude grid and move
//! covariance and averaging-kernel matrices between the natural basis
//! `{ln[H2O], ln[HDO]}` and the decorrelated basis
//! `{(ln[H2O]+ln[HDO])/2, ln[HDO]-ln[H2O]}`.
//!
//! Key behaviors
//! -------------
//! - [`Covariance::traf`] builds the basis transform
//!
//!   ```text
//!   P = [[ 0.5·I,  0.5·I ],
//!        [   -I,      I  ]]        (each block nol × nol)
//!   ```
//!
//!   and [`Covariance::traf_inverse`] inverts it numerically.
//! - [`Covariance::assumed_covariance`] builds `Sa'` in the decorrelated
//!   basis; [`Covariance::apriori_covariance`] maps it back to the natural
//!   basis via `Sa = P⁻¹ · Sa' · (P⁻¹)ᵀ`.
//! - [`Covariance::type1_of`] maps a natural-basis matrix to
//!   `A' = P · A · P⁻¹`; [`Covariance::type2_of`] applies the a-posteriori
//!   correction `A'' = C · A'` with `C` from [`Covariance::c_by_type1`].
//! - [`Covariance::smoothing_error`] computes
//!   `(A − B) · Sa' · (A − B)ᵀ`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `nol > 0` and the altitude grid has exactly `nol` entries.
//! - Every method is a pure function of its arguments and the two
//!   configuration fields; the calculator is immutable and `Send + Sync`.
//! - Matrix arguments are validated for shape before any product is formed.
//!
//! Conventions
//! -----------
//! - Level index `i` runs from 0 to `nol − 1`; in `2·nol` state vectors the
//!   first `nol` entries belong to the first species component and the last
//!   `nol` to the second.
//! - `P⁻¹` always comes from an actual inversion, never from its closed form.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the block layout of `P`, `C`, and `Sa'`, the concrete
//!   three-level scenario, symmetry / PSD of `Sa'` and `Sa`, round trips
//!   through the similarity transform, and every error path.
use crate::covariance::{
    altitude::AltitudeGrid,
    errors::{CovError, CovResult},
    kernel::{correlation_matrix, gaussian},
    linalg::{checked_dot, ensure_shape, ensure_square, invert},
    options::{AssumedOptions, Species},
};
use ndarray::{Array2, ArrayView2, s};

/// Covariance — assumed covariances and basis transforms on a level grid.
///
/// Fields
/// ------
/// - `nol`: `usize`
///   Number of atmospheric levels.
/// - `alt`: [`AltitudeGrid`]
///   Altitudes of the levels in meters, possibly with masked entries.
///
/// Invariants
/// ----------
/// - `nol > 0` and `alt.len() == nol`.
///
/// Performance
/// -----------
/// - Construction is O(nol). Transforms are dominated by dense `O(n³)`
///   products and one inversion of `P` with `n = 2·nol`.
#[derive(Debug, Clone, PartialEq)]
pub struct Covariance {
    nol: usize,
    alt: AltitudeGrid,
}

impl Covariance {
    /// Construct a calculator for `nol` levels at the given altitudes.
    ///
    /// Errors
    /// ------
    /// - `CovError::EmptyGrid` when `nol == 0`.
    /// - `CovError::LevelCountMismatch` when `alt.len() != nol`.
    pub fn new(nol: usize, alt: AltitudeGrid) -> CovResult<Self> {
        if nol == 0 {
            return Err(CovError::EmptyGrid);
        }
        if alt.len() != nol {
            return Err(CovError::LevelCountMismatch { nol, len: alt.len() });
        }
        Ok(Covariance { nol, alt })
    }

    /// Convenience constructor for a fully unmasked altitude grid.
    pub fn from_altitudes(nol: usize, alt: &[f64]) -> CovResult<Self> {
        Covariance::new(nol, AltitudeGrid::from_values(alt)?)
    }

    pub fn nol(&self) -> usize {
        self.nol
    }

    pub fn altitudes(&self) -> &AltitudeGrid {
        &self.alt
    }

    /// Gaussian `exp(-(x-mu)² / (2·sig²))`; see [`gaussian`].
    pub fn gaussian(&self, x: f64, mu: f64, sig: f64) -> f64 {
        gaussian(x, mu, sig)
    }

    /// P — transform from `{ln[H2O], ln[HDO]}` to the decorrelated basis.
    ///
    /// Returns
    /// -------
    /// `2·nol × 2·nol` matrix with blocks `[[0.5·I, 0.5·I], [−I, I]]`.
    pub fn traf(&self) -> Array2<f64> {
        let n = self.nol;
        let mut p = Array2::<f64>::zeros((2 * n, 2 * n));
        for i in 0..n {
            p[[i, i]] = 0.5;
            p[[i, i + n]] = 0.5;
            p[[i + n, i]] = -1.0;
            p[[i + n, i + n]] = 1.0;
        }
        p
    }

    /// P⁻¹ — numerical inverse of [`Covariance::traf`].
    ///
    /// Errors
    /// ------
    /// - `CovError::SingularMatrix` if the inversion fails; `P` has
    ///   determinant `1` for every `nol`, so this only signals a numerical
    ///   breakdown.
    pub fn traf_inverse(&self) -> CovResult<Array2<f64>> {
        invert("traf_inverse", self.traf().view())
    }

    /// Sa' — assumed covariance of the decorrelated state.
    ///
    /// Parameters
    /// ----------
    /// - `opts`: [`AssumedOptions`]
    ///   Species, block weights `w1`/`w2`, and correlation length.
    ///
    /// Returns
    /// -------
    /// `species·nol` square matrix with
    /// `Sa'[i, j] = w1·g(alt[i]; alt[j], L)` in the upper-left block and,
    /// for [`Species::Pair`], `Sa'[nol+i, nol+j] = w2·g(alt[i]; alt[j], L)`
    /// in the lower-right block. The cross blocks are zero: no correlation
    /// is assumed between the combined and the differential state.
    ///
    /// Notes
    /// -----
    /// - Masked altitudes yield NaN rows and columns in both blocks.
    pub fn assumed_covariance(&self, opts: &AssumedOptions) -> Array2<f64> {
        let n = self.nol;
        let size = opts.species.count() * n;
        let kernel = correlation_matrix(&self.alt, opts.correlation_length);
        let mut result = Array2::<f64>::zeros((size, size));
        result.slice_mut(s![..n, ..n]).assign(&(&kernel * opts.w1));
        if opts.species == Species::Pair {
            result.slice_mut(s![n.., n..]).assign(&(&kernel * opts.w2));
        }
        result
    }

    /// [`Covariance::assumed_covariance`] from a raw species count.
    ///
    /// Errors
    /// ------
    /// - `CovError::InvalidSpecies` when `species ∉ {1, 2}`.
    /// - `CovError::InvalidWeight` / `CovError::InvalidCorrelationLength`
    ///   for non-finite parameters.
    pub fn assumed_covariance_for(
        &self, species: usize, w1: f64, w2: f64, correlation_length: f64,
    ) -> CovResult<Array2<f64>> {
        let opts = AssumedOptions::new(species, w1, w2, correlation_length)?;
        Ok(self.assumed_covariance(&opts))
    }

    /// Sa — a-priori covariance of the natural `{ln[H2O], ln[HDO]}` state.
    ///
    /// Inverts `Sa' = P · Sa · Pᵀ` as `Sa = P⁻¹ · Sa' · (P⁻¹)ᵀ`, using the
    /// default [`AssumedOptions`].
    pub fn apriori_covariance(&self) -> CovResult<Array2<f64>> {
        self.apriori_covariance_with(&AssumedOptions::default())
    }

    /// [`Covariance::apriori_covariance`] with custom weights and length.
    ///
    /// Errors
    /// ------
    /// - `CovError::InvalidSpecies` for [`Species::Single`]: `P` spans both
    ///   species, so the congruence needs a `2·nol` square `Sa'`.
    /// - `CovError::SingularMatrix` if `P` cannot be inverted.
    pub fn apriori_covariance_with(&self, opts: &AssumedOptions) -> CovResult<Array2<f64>> {
        if opts.species != Species::Pair {
            return Err(CovError::InvalidSpecies { species: opts.species.count() });
        }
        let p_inv = self.traf_inverse()?;
        let sa_traf = self.assumed_covariance(opts);
        Ok(p_inv.dot(&sa_traf).dot(&p_inv.t()))
    }

    /// General similarity transform `T · M · T⁻¹`.
    ///
    /// Errors
    /// ------
    /// - `CovError::NotSquare` if `transform` or `matrix` is not square.
    /// - `CovError::DimensionMismatch` if their sizes differ.
    /// - `CovError::SingularMatrix` if `transform` is not invertible.
    pub fn similarity(
        &self, matrix: &Array2<f64>, transform: &Array2<f64>,
    ) -> CovResult<Array2<f64>> {
        similarity("similarity", matrix.view(), transform.view())
    }

    /// A' — `P · M · P⁻¹`, a natural-basis matrix in the decorrelated basis.
    ///
    /// Errors
    /// ------
    /// - `CovError::NotSquare` / `CovError::DimensionMismatch` unless `matrix`
    ///   is `2·nol × 2·nol`.
    pub fn type1_of(&self, matrix: &Array2<f64>) -> CovResult<Array2<f64>> {
        self.ensure_state_sized("type1_of", matrix.view())?;
        similarity("type1_of", matrix.view(), self.traf().view())
    }

    /// `P⁻¹ · M · P`, the inverse of [`Covariance::type1_of`].
    pub fn type1_inverse_of(&self, matrix: &Array2<f64>) -> CovResult<Array2<f64>> {
        self.ensure_state_sized("type1_inverse_of", matrix.view())?;
        let p_inv = self.traf_inverse()?;
        similarity("type1_inverse_of", matrix.view(), p_inv.view())
    }

    /// C — a-posteriori correction operator built from a type-1 matrix.
    ///
    /// ```text
    /// C = [[  A'[nol:, nol:],  0 ],
    ///      [ −A'[nol:, :nol],  I ]]
    /// ```
    ///
    /// Errors
    /// ------
    /// - `CovError::NotSquare` / `CovError::DimensionMismatch` unless `a_traf`
    ///   is `2·nol × 2·nol`.
    pub fn c_by_type1(&self, a_traf: &Array2<f64>) -> CovResult<Array2<f64>> {
        self.ensure_state_sized("c_by_type1", a_traf.view())?;
        let n = self.nol;
        let mut c = Array2::<f64>::zeros((2 * n, 2 * n));
        c.slice_mut(s![..n, ..n]).assign(&a_traf.slice(s![n.., n..]));
        c.slice_mut(s![n.., ..n]).assign(&a_traf.slice(s![n.., ..n]).mapv(|v| -v));
        c.slice_mut(s![n.., n..]).diag_mut().fill(1.0);
        Ok(c)
    }

    /// C directly from a natural-basis averaging kernel.
    pub fn c_by_avk(&self, avk: &Array2<f64>) -> CovResult<Array2<f64>> {
        let a_traf = self.type1_of(avk)?;
        self.c_by_type1(&a_traf)
    }

    /// A'' — a-posteriori transformed matrix `C · A'`.
    pub fn type2_of(&self, matrix: &Array2<f64>) -> CovResult<Array2<f64>> {
        let a_traf = self.type1_of(matrix)?;
        let c = self.c_by_type1(&a_traf)?;
        Ok(c.dot(&a_traf))
    }

    /// S's — smoothing error `(A − B) · Sa' · (A − B)ᵀ`.
    ///
    /// Parameters
    /// ----------
    /// - `actual_matrix`: `&Array2<f64>`
    ///   Operator actually applied (e.g. a type-2 averaging kernel).
    /// - `to_compare`: `&Array2<f64>`
    ///   Reference operator of the same shape.
    /// - `opts`: [`AssumedOptions`]
    ///   Configuration of `Sa'`; its `species·nol` size must equal the
    ///   column count of the inputs.
    ///
    /// Errors
    /// ------
    /// - `CovError::DimensionMismatch` if the inputs differ in shape or their
    ///   column count does not match `Sa'`.
    pub fn smoothing_error(
        &self, actual_matrix: &Array2<f64>, to_compare: &Array2<f64>, opts: &AssumedOptions,
    ) -> CovResult<Array2<f64>> {
        let op = "smoothing_error";
        ensure_shape(op, to_compare.view(), actual_matrix.dim())?;
        let diff = actual_matrix - to_compare;
        let sa_traf = self.assumed_covariance(opts);
        let weighted = checked_dot(op, diff.view(), sa_traf.view())?;
        checked_dot(op, weighted.view(), diff.t())
    }

    fn ensure_state_sized(&self, op: &'static str, matrix: ArrayView2<'_, f64>) -> CovResult<()> {
        ensure_square(op, matrix)?;
        ensure_shape(op, matrix, (2 * self.nol, 2 * self.nol))
    }
}

fn similarity(
    op: &'static str, matrix: ArrayView2<'_, f64>, transform: ArrayView2<'_, f64>,
) -> CovResult<Array2<f64>> {
    let n = ensure_square(op, transform)?;
    ensure_square(op, matrix)?;
    ensure_shape(op, matrix, (n, n))?;
    let transform_inv = invert(op, transform)?;
    Ok(transform.dot(&matrix).dot(&transform_inv))
}
