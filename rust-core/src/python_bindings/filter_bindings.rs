//! Python bindings for analysis windows

use numpy::PyArray1;
use pyo3::prelude::*;

use crate::filters::{generate_window, WindowType};

/// Window type enum exposed to Python
#[pyclass(name = "WindowType")]
#[derive(Clone)]
pub enum PyWindowType {
    Tukey,
    Hann,
    Hamming,
    Blackman,
    Rectangular,
}

impl From<PyWindowType> for WindowType {
    fn from(py_win: PyWindowType) -> Self {
        match py_win {
            PyWindowType::Tukey => WindowType::Tukey,
            PyWindowType::Hann => WindowType::Hann,
            PyWindowType::Hamming => WindowType::Hamming,
            PyWindowType::Blackman => WindowType::Blackman,
            PyWindowType::Rectangular => WindowType::Rectangular,
        }
    }
}

/// Window coefficients
///
/// Args:
///     window_type: Window shape
///     length: Number of samples
///     flat_length: Length of the flat part (Tukey only)
///
/// Returns:
///     Coefficients as numpy array
#[pyfunction]
#[pyo3(signature = (window_type, length, flat_length=0))]
pub fn window<'py>(
    py: Python<'py>,
    window_type: PyWindowType,
    length: usize,
    flat_length: usize,
) -> &'py PyArray1<f64> {
    PyArray1::from_vec(py, generate_window(window_type.into(), length, flat_length))
}
