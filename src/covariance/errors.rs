//! covariance::errors — error type for covariance construction and transforms.
//!
//! Purpose
//! -------
//! Define [`CovError`], the single error type returned by every fallible
//! routine in [`crate::covariance`], together with the [`CovResult`] alias.
//!
//! Key behaviors
//! -------------
//! - Group failures into three classes: invalid arguments (species, weights,
//!   altitude grid), dimension mismatches (non-square or non-conformable
//!   matrices), and singular matrices (failed inversion).
//! - Carry the offending values (shape, index, operation name) so messages
//!   are actionable without access to the inputs.
//! - Convert to a Python `ValueError` when the `python-bindings` feature is
//!   enabled.
//!
//! Conventions
//! -----------
//! - Shapes are reported as `(rows, cols)`.
//! - `op` fields name the public operation that detected the problem
//!   (e.g. `"type1_of"`), not an internal helper.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for covariance operations that may produce [`CovError`].
pub type CovResult<T> = Result<T, CovError>;

/// CovError — failure modes of the covariance calculator.
///
/// Variants
/// --------
/// - `InvalidSpecies { species }`
///   Species count outside {1, 2}.
/// - `InvalidWeight { name, value, reason }`
///   A block weight (`w1` or `w2`) is not finite.
/// - `InvalidCorrelationLength { value, reason }`
///   Correlation length is not finite.
/// - `EmptyGrid`
///   Zero atmospheric levels were requested.
/// - `LevelCountMismatch { nol, len }`
///   The altitude grid length differs from the level count.
/// - `NonFiniteAltitude { index, value }`
///   An unmasked altitude is NaN or ±∞.
/// - `DimensionMismatch { op, expected, found }`
///   A matrix argument does not have the shape the operation requires.
/// - `NotSquare { op, shape }`
///   A matrix that must be square is not.
/// - `SingularMatrix { op, dim }`
///   Inversion of a `dim × dim` matrix failed.
#[derive(Debug, Clone, PartialEq)]
pub enum CovError {
    // ---- Invalid arguments ----
    InvalidSpecies { species: usize },
    InvalidWeight { name: &'static str, value: f64, reason: &'static str },
    InvalidCorrelationLength { value: f64, reason: &'static str },

    // ---- Altitude grid ----
    EmptyGrid,
    LevelCountMismatch { nol: usize, len: usize },
    NonFiniteAltitude { index: usize, value: f64 },

    // ---- Linear algebra ----
    DimensionMismatch { op: &'static str, expected: (usize, usize), found: (usize, usize) },
    NotSquare { op: &'static str, shape: (usize, usize) },
    SingularMatrix { op: &'static str, dim: usize },
}

impl CovError {
    /// True for argument and configuration errors (species, weights, grid).
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            CovError::InvalidSpecies { .. }
                | CovError::InvalidWeight { .. }
                | CovError::InvalidCorrelationLength { .. }
                | CovError::EmptyGrid
                | CovError::LevelCountMismatch { .. }
                | CovError::NonFiniteAltitude { .. }
        )
    }

    /// True for shape errors, including non-square inputs.
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, CovError::DimensionMismatch { .. } | CovError::NotSquare { .. })
    }

    pub fn is_singular(&self) -> bool {
        matches!(self, CovError::SingularMatrix { .. })
    }
}

impl std::error::Error for CovError {}

impl std::fmt::Display for CovError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Invalid arguments ----
            CovError::InvalidSpecies { species } => {
                write!(f, "Invalid species count {species}: only 1 or 2 species are supported.")
            }
            CovError::InvalidWeight { name, value, reason } => {
                write!(f, "Invalid weight {name} = {value}: {reason}")
            }
            CovError::InvalidCorrelationLength { value, reason } => {
                write!(f, "Invalid correlation length {value}: {reason}")
            }

            // ---- Altitude grid ----
            CovError::EmptyGrid => write!(f, "Number of levels must be positive."),
            CovError::LevelCountMismatch { nol, len } => {
                write!(f, "Altitude grid has {len} entries but {nol} levels were requested.")
            }
            CovError::NonFiniteAltitude { index, value } => {
                write!(f, "Altitude at level {index} is not finite: {value}")
            }

            // ---- Linear algebra ----
            CovError::DimensionMismatch { op, expected, found } => write!(
                f,
                "{op}: dimension mismatch (expected {}x{}, found {}x{})",
                expected.0, expected.1, found.0, found.1
            ),
            CovError::NotSquare { op, shape } => {
                write!(f, "{op}: matrix must be square, found {}x{}", shape.0, shape.1)
            }
            CovError::SingularMatrix { op, dim } => {
                write!(f, "{op}: {dim}x{dim} matrix is singular and cannot be inverted")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<CovError> for PyErr {
    fn from(err: CovError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
