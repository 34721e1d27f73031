//! Altitude grid with optionally masked levels.
//!
//! Upstream retrieval products deliver altitudes as masked arrays: some levels
//! may be missing. [`AltitudeGrid`] stores one `Option<f64>` per level, with
//! `None` marking a masked entry. Masked levels are kept (not dropped) so the
//! grid length always equals the level count; when they enter the Gaussian
//! kernel they evaluate as NaN.
use crate::covariance::errors::{CovError, CovResult};

/// Ordered altitudes (meters) of the atmospheric levels.
///
/// Invariants
/// ----------
/// - Every unmasked entry is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct AltitudeGrid {
    levels: Vec<Option<f64>>,
}

impl AltitudeGrid {
    /// Build a grid from per-level optional altitudes.
    ///
    /// Errors
    /// ------
    /// - `CovError::NonFiniteAltitude` if an unmasked entry is NaN or ±∞.
    pub fn new(levels: Vec<Option<f64>>) -> CovResult<Self> {
        for (index, level) in levels.iter().enumerate() {
            if let Some(value) = *level {
                if !value.is_finite() {
                    return Err(CovError::NonFiniteAltitude { index, value });
                }
            }
        }
        Ok(AltitudeGrid { levels })
    }

    /// Build a fully unmasked grid.
    pub fn from_values(values: &[f64]) -> CovResult<Self> {
        AltitudeGrid::new(values.iter().copied().map(Some).collect())
    }

    /// Build a grid from values plus a numpy-style mask (`true` = masked).
    ///
    /// Errors
    /// ------
    /// - `CovError::LevelCountMismatch` if the mask and values differ in length.
    /// - `CovError::NonFiniteAltitude` if an unmasked value is NaN or ±∞.
    pub fn from_masked(values: &[f64], mask: &[bool]) -> CovResult<Self> {
        if values.len() != mask.len() {
            return Err(CovError::LevelCountMismatch { nol: values.len(), len: mask.len() });
        }
        let levels = values
            .iter()
            .zip(mask)
            .map(|(&value, &masked)| if masked { None } else { Some(value) })
            .collect();
        AltitudeGrid::new(levels)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Altitude of level `i`; `None` when masked or out of range.
    pub fn get(&self, i: usize) -> Option<f64> {
        self.levels.get(i).copied().flatten()
    }

    /// Altitude of level `i`, with masked levels mapped to NaN.
    pub fn value_or_nan(&self, i: usize) -> f64 {
        self.get(i).unwrap_or(f64::NAN)
    }

    /// True when no level is masked.
    pub fn is_complete(&self) -> bool {
        self.levels.iter().all(Option::is_some)
    }

    /// Indices of masked levels, ascending.
    pub fn masked_levels(&self) -> Vec<usize> {
        self.levels.iter().enumerate().filter(|(_, level)| level.is_none()).map(|(i, _)| i).collect()
    }
}
