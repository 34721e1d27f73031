//! covariance::options — configuration for assumed a-priori covariances.
//!
//! Purpose
//! -------
//! Represent the tuning knobs of the assumed covariance `Sa'` (species count,
//! block weights, correlation length) as a validated, copyable value so that
//! every operation consuming `Sa'` is configured in one place.
//!
//! Key behaviors
//! -------------
//! - [`Species`] restricts the modeled state to one (combined only) or two
//!   (combined and differential) components; raw counts convert through
//!   `TryFrom<usize>`.
//! - [`AssumedOptions`] bundles species, `w1`, `w2`, and the correlation
//!   length, with defaults matching the standard {H2O, HDO} setup.
//!
//! Invariants & assumptions
//! ------------------------
//! - `w1`, `w2`, and `correlation_length` are finite when built via
//!   [`AssumedOptions::new`]. A zero correlation length is accepted and
//!   yields IEEE special values in the Gaussian kernel.
//! - `w2` is ignored for [`Species::Single`].
use crate::covariance::errors::{CovError, CovResult};

/// Default weight of the combined-state block `(ln[H2O]+ln[HDO])/2`.
pub const DEFAULT_W1: f64 = 1.0;

/// Default weight of the differential-state block `ln[HDO]-ln[H2O]`.
pub const DEFAULT_W2: f64 = 0.01;

/// Default altitude correlation length in meters.
pub const DEFAULT_CORRELATION_LENGTH: f64 = 2500.0;

/// Number of atmospheric species carried in the state vector.
///
/// - `Single`: only the combined state; matrices are `nol × nol`.
/// - `Pair`: combined and differential states; matrices are `2·nol × 2·nol`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Species {
    Single,
    #[default]
    Pair,
}

impl Species {
    /// Number of state components (1 or 2).
    pub fn count(self) -> usize {
        match self {
            Species::Single => 1,
            Species::Pair => 2,
        }
    }
}

impl TryFrom<usize> for Species {
    type Error = CovError;

    fn try_from(species: usize) -> CovResult<Self> {
        match species {
            1 => Ok(Species::Single),
            2 => Ok(Species::Pair),
            _ => Err(CovError::InvalidSpecies { species }),
        }
    }
}

/// AssumedOptions — configuration of the assumed covariance `Sa'`.
///
/// Fields
/// ------
/// - `species`: [`Species`]
///   Whether the differential block is populated.
/// - `w1`: `f64`
///   Weight of the upper-left (combined-state) block.
/// - `w2`: `f64`
///   Weight of the lower-right (differential-state) block.
/// - `correlation_length`: `f64`
///   Altitude scale in meters of the Gaussian falloff between levels.
///
/// Notes
/// -----
/// - `Default` gives `Pair`, `w1 = 1.0`, `w2 = 0.01`,
///   `correlation_length = 2500.0`.
/// - Fields are public for struct-update syntax; use [`AssumedOptions::new`]
///   when values come from outside the crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssumedOptions {
    pub species: Species,
    pub w1: f64,
    pub w2: f64,
    pub correlation_length: f64,
}

impl Default for AssumedOptions {
    fn default() -> Self {
        AssumedOptions {
            species: Species::Pair,
            w1: DEFAULT_W1,
            w2: DEFAULT_W2,
            correlation_length: DEFAULT_CORRELATION_LENGTH,
        }
    }
}

impl AssumedOptions {
    /// Construct validated options from a raw species count.
    ///
    /// Errors
    /// ------
    /// - `CovError::InvalidSpecies` when `species ∉ {1, 2}`.
    /// - `CovError::InvalidWeight` when `w1` or `w2` is NaN or ±∞.
    /// - `CovError::InvalidCorrelationLength` when the length is NaN or ±∞.
    pub fn new(species: usize, w1: f64, w2: f64, correlation_length: f64) -> CovResult<Self> {
        let species = Species::try_from(species)?;
        validate_weight("w1", w1)?;
        validate_weight("w2", w2)?;
        if !correlation_length.is_finite() {
            return Err(CovError::InvalidCorrelationLength {
                value: correlation_length,
                reason: "must be finite",
            });
        }
        Ok(AssumedOptions { species, w1, w2, correlation_length })
    }

    /// Default weights and correlation length for the given species.
    pub fn with_species(species: Species) -> Self {
        AssumedOptions { species, ..AssumedOptions::default() }
    }
}

fn validate_weight(name: &'static str, value: f64) -> CovResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CovError::InvalidWeight { name, value, reason: "must be finite" })
    }
}
