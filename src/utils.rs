//! Conversion helpers between Python objects and Rust matrix / grid types.
//!
//! Only compiled with the `python-bindings` feature.
#[cfg(feature = "python-bindings")]
use ndarray::Array2;

#[cfg(feature = "python-bindings")]
use numpy::PyReadonlyArray2;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::covariance::altitude::AltitudeGrid;

/// Copy a 2-D float64 numpy array (or nested sequence) into an `Array2<f64>`.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(raw: &Bound<'py, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr.as_array().to_owned());
    }

    let rows: Vec<Vec<f64>> = raw.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 2-D numpy.ndarray or nested sequence of float64",
        )
    })?;
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != ncols) {
        return Err(pyo3::exceptions::PyValueError::new_err("matrix rows must have equal length"));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

/// Build an [`AltitudeGrid`] from a Python altitude sequence.
///
/// Masked arrays are filled with NaN first; `None` and NaN entries are both
/// treated as masked levels.
#[cfg(feature = "python-bindings")]
pub fn extract_altitudes<'py>(raw: &Bound<'py, PyAny>) -> PyResult<AltitudeGrid> {
    let filled = if raw.hasattr("filled")? {
        raw.call_method1("filled", (f64::NAN,))?
    } else {
        raw.clone()
    };
    let values: Vec<Option<f64>> = filled.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy (masked) array or sequence of float64/None",
        )
    })?;
    let levels = values.into_iter().map(|v| v.filter(|x| !x.is_nan())).collect();
    Ok(AltitudeGrid::new(levels)?)
}
