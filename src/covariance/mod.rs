//! covariance — assumed covariances and basis transforms for {H2O, HDO} retrievals.
//!
//! Purpose
//! -------
//! Provide the linear algebra used to analyse water-isotope profile
//! retrievals: assumed a-priori covariances over an altitude grid, the
//! transform between the natural state `{ln[H2O], ln[HDO]}` and the
//! decorrelated state `{(ln[H2O]+ln[HDO])/2, ln[HDO]-ln[H2O]}`, the type-1 and
//! type-2 transformed averaging kernels, and smoothing-error covariances.
//!
//! Key behaviors
//! -------------
//! - Define [`CovError`] / [`CovResult`] for invalid arguments, dimension
//!   mismatches, and singular matrices.
//! - Configure `Sa'` through [`AssumedOptions`] and [`Species`].
//! - Represent possibly masked altitudes with [`AltitudeGrid`].
//! - Expose every matrix operation as a method of [`Covariance`].
//!
//! Invariants & assumptions
//! ------------------------
//! - All matrices are dense `ndarray::Array2<f64>` with sizes that are
//!   multiples of the level count `nol`.
//! - Matrix inversion goes through `nalgebra`; nothing is inverted in closed
//!   form.
//! - Masked altitudes propagate as NaN into the kernel entries they touch.
//!
//! Conventions
//! -----------
//! - All functions are pure: no logging, no global state, no `unsafe`.
//!   Failures are reported via [`CovResult`] only.
//! - Shapes are checked before multiplying, so non-conformable inputs return
//!   an error instead of panicking inside `ndarray`.
//!
//! Downstream usage
//! ----------------
//! - Build a [`Covariance`] once per retrieval product (level count and
//!   altitudes), then call its methods for every averaging kernel:
//!   `type2_of` for the a-posteriori kernel and `smoothing_error` against a
//!   reference operator.
//! - `use iasi_covariance::covariance::prelude::*;` imports the main surface.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each submodule; `tests/` holds an end-to-end
//!   run on a synthetic 29-level grid.

pub mod altitude;
pub mod calculator;
pub mod errors;
pub mod kernel;
pub mod linalg;
pub mod options;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::altitude::AltitudeGrid;
pub use self::calculator::Covariance;
pub use self::errors::{CovError, CovResult};
pub use self::kernel::{correlation_matrix, gaussian};
pub use self::options::{AssumedOptions, Species};

pub mod prelude {
    pub use super::altitude::AltitudeGrid;
    pub use super::calculator::Covariance;
    pub use super::errors::{CovError, CovResult};
    pub use super::options::{AssumedOptions, Species};
}
