//! iasi_covariance — covariance and error propagation for {H2O, HDO} retrievals.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and, when the `python-bindings`
//! feature is enabled, as the PyO3 bridge that exposes the covariance
//! calculator to Python via the `_iasi_covariance` extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the [`covariance`] module as the public crate surface.
//! - Define the `#[pyclass]` wrapper [`PyCovariance`] and the `#[pymodule]`
//!   initializer registering it under `iasi_covariance.metrics`.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in [`covariance`]; this file performs only FFI
//!   glue, argument conversion, and error mapping.
//! - Python-visible methods mirror the Rust methods one to one, with the
//!   assumed-covariance options flattened into keyword arguments
//!   (`species=2, w1=1.0, w2=0.01, correlation_length=2500`).
//!
//! Conventions
//! -----------
//! - Matrices cross the boundary as 2-D float64 numpy arrays and are copied
//!   into `ndarray::Array2<f64>` on entry.
//! - Altitudes may be a numpy masked array, a float array with NaN for
//!   missing levels, or a sequence containing `None`.
//! - [`covariance::CovError`] values become Python `ValueError`s.
//!
//! Downstream usage
//! ----------------
//! - Rust code should depend on [`covariance`] directly and ignore the items
//!   guarded by `python-bindings`.
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in [`covariance`] and by the
//!   integration tests in `tests/`. The PyO3 layer is exercised from Python.

pub mod covariance;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    covariance::{calculator::Covariance, options::AssumedOptions},
    utils::{extract_altitudes, extract_f64_matrix},
};

/// PyCovariance — Python-facing wrapper around [`Covariance`].
///
/// Purpose
/// -------
/// Let Python retrieval pipelines build assumed covariances and transformed
/// averaging kernels without leaving numpy.
///
/// Parameters
/// ----------
/// Constructed from Python via `Covariance(nol, alt)`:
/// - `nol`: `usize`
///   Number of atmospheric levels; must be positive.
/// - `alt`: `&PyAny`
///   Altitudes (meters) of length `nol`; masked / NaN / `None` entries are
///   treated as missing levels.
///
/// Fields
/// ------
/// - `inner`: [`Covariance`]
///   Validated Rust calculator.
///
/// Notes
/// -----
/// - Each call copies its matrix arguments once; results are moved into new
///   numpy arrays without further copies.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "Covariance", module = "iasi_covariance.metrics", frozen)]
pub struct PyCovariance {
    inner: Covariance,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyCovariance {
    #[new]
    #[pyo3(text_signature = "(nol, alt, /)")]
    pub fn new<'py>(nol: usize, alt: &Bound<'py, PyAny>) -> PyResult<Self> {
        let grid = extract_altitudes(alt)?;
        let inner = Covariance::new(nol, grid)?;
        Ok(PyCovariance { inner })
    }

    #[getter]
    pub fn nol(&self) -> usize {
        self.inner.nol()
    }

    pub fn gaussian(&self, x: f64, mu: f64, sig: f64) -> f64 {
        self.inner.gaussian(x, mu, sig)
    }

    pub fn traf<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.traf().into_pyarray(py)
    }

    #[pyo3(signature = (species = 2, w1 = 1.0, w2 = 0.01, correlation_length = 2500.0))]
    pub fn assumed_covariance<'py>(
        &self, py: Python<'py>, species: usize, w1: f64, w2: f64, correlation_length: f64,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let opts = AssumedOptions::new(species, w1, w2, correlation_length)?;
        Ok(self.inner.assumed_covariance(&opts).into_pyarray(py))
    }

    pub fn apriori_covariance<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        Ok(self.inner.apriori_covariance()?.into_pyarray(py))
    }

    pub fn type1_of<'py>(
        &self, py: Python<'py>, matrix: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let matrix = extract_f64_matrix(matrix)?;
        Ok(self.inner.type1_of(&matrix)?.into_pyarray(py))
    }

    pub fn c_by_type1<'py>(
        &self, py: Python<'py>, a_traf: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let a_traf = extract_f64_matrix(a_traf)?;
        Ok(self.inner.c_by_type1(&a_traf)?.into_pyarray(py))
    }

    pub fn c_by_avk<'py>(
        &self, py: Python<'py>, avk: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let avk = extract_f64_matrix(avk)?;
        Ok(self.inner.c_by_avk(&avk)?.into_pyarray(py))
    }

    pub fn type2_of<'py>(
        &self, py: Python<'py>, matrix: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let matrix = extract_f64_matrix(matrix)?;
        Ok(self.inner.type2_of(&matrix)?.into_pyarray(py))
    }

    #[pyo3(signature = (
        actual_matrix,
        to_compare,
        species = 2,
        w1 = 1.0,
        w2 = 0.01,
        correlation_length = 2500.0,
    ))]
    pub fn smoothing_error<'py>(
        &self, py: Python<'py>, actual_matrix: &Bound<'py, PyAny>, to_compare: &Bound<'py, PyAny>,
        species: usize, w1: f64, w2: f64, correlation_length: f64,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let actual = extract_f64_matrix(actual_matrix)?;
        let reference = extract_f64_matrix(to_compare)?;
        let opts = AssumedOptions::new(species, w1, w2, correlation_length)?;
        Ok(self.inner.smoothing_error(&actual, &reference, &opts)?.into_pyarray(py))
    }
}

/// _iasi_covariance — PyO3 module initializer.
///
/// Creates the `metrics` submodule, attaches it to the extension module, and
/// registers it in `sys.modules` so `iasi_covariance.metrics` is importable
/// with dot notation.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _iasi_covariance<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let metrics_mod = PyModule::new(_py, "metrics")?;
    metrics_mod.add_class::<PyCovariance>()?;
    m.add_submodule(&metrics_mod)?;

    _py.import("sys")?.getattr("modules")?.set_item("iasi_covariance.metrics", metrics_mod)?;
    Ok(())
}
