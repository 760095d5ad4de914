//! Python bindings for conditioning and the burst search

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use super::filter_bindings::PyWindowType;
use crate::conditioning::{self, ConditioningParams};
use crate::error::SearchError;
use crate::search::{self, BurstEvent, SearchParams};
use crate::series::TimeSeries;

impl From<SearchError> for PyErr {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Allocation(_) | SearchError::Conditioning(_) => {
                PyValueError::new_err(err.to_string())
            }
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

fn to_series(
    samples: &PyReadonlyArray1<f64>,
    delta_t: f64,
    epoch: f64,
    channel: &str,
) -> PyResult<TimeSeries> {
    let data = samples
        .as_slice()
        .map_err(|e| PyValueError::new_err(format!("samples must be contiguous: {e}")))?
        .to_vec();
    Ok(TimeSeries::new(channel, epoch, delta_t, "strain", data)?)
}

/// Burst event exposed to Python
#[pyclass(name = "BurstEvent")]
#[derive(Clone)]
pub struct PyBurstEvent {
    #[pyo3(get)]
    channel: String,
    #[pyo3(get)]
    start_time: f64,
    #[pyo3(get)]
    duration: f64,
    #[pyo3(get)]
    central_freq: f64,
    #[pyo3(get)]
    bandwidth: f64,
    #[pyo3(get)]
    tf_volume: f64,
    #[pyo3(get)]
    snr: f64,
    #[pyo3(get)]
    confidence: f64,
}

impl From<BurstEvent> for PyBurstEvent {
    fn from(event: BurstEvent) -> Self {
        Self {
            channel: event.channel,
            start_time: event.start_time,
            duration: event.duration,
            central_freq: event.central_freq,
            bandwidth: event.bandwidth,
            tf_volume: event.tf_volume,
            snr: event.snr,
            confidence: event.confidence,
        }
    }
}

#[pymethods]
impl PyBurstEvent {
    fn __repr__(&self) -> String {
        format!(
            "BurstEvent(start_time={:.4}, duration={}, central_freq={}, bandwidth={}, confidence={:.2})",
            self.start_time, self.duration, self.central_freq, self.bandwidth, self.confidence
        )
    }
}

/// Condition a series for the search
///
/// Args:
///     samples: Input samples as numpy array
///     delta_t: Sample interval in seconds
///     epoch: GPS time of the first sample
///     flow: High-pass edge in Hz (0 disables)
///     resample_delta_t: Target sample interval in seconds
///     corruption: Samples trimmed from each end
///
/// Returns:
///     (samples, epoch, delta_t) of the conditioned series
#[pyfunction]
#[pyo3(signature = (samples, delta_t, epoch=0.0, flow=40.0, resample_delta_t=1.0/4096.0, corruption=0))]
pub fn condition_data<'py>(
    py: Python<'py>,
    samples: PyReadonlyArray1<f64>,
    delta_t: f64,
    epoch: f64,
    flow: f64,
    resample_delta_t: f64,
    corruption: usize,
) -> PyResult<(&'py PyArray1<f64>, f64, f64)> {
    let series = to_series(&samples, delta_t, epoch, "")?;
    let params = ConditioningParams {
        flow,
        resample_delta_t,
        corruption,
    };

    let conditioned = py.allow_threads(|| conditioning::condition_data(series, &params))?;
    let (epoch, delta_t) = (conditioned.epoch, conditioned.delta_t());

    Ok((PyArray1::from_slice(py, conditioned.data()), epoch, delta_t))
}

/// Run an excess-power burst search
///
/// Args:
///     samples: Conditioned samples as numpy array
///     delta_t: Sample interval in seconds
///     epoch: GPS time of the first sample
///     channel: Channel name recorded on events
///     window_length: Analysis window length in samples
///     window_type: Analysis window shape
///     flow: Low edge of the searched band in Hz
///     bandwidth: Width of the searched band in Hz
///     confidence_threshold: Minimum -ln(probability) to report a tile
///     fractional_stride: Window shift as a fraction of the window
///     max_tile_bandwidth: Largest tile bandwidth in Hz
///     max_tile_duration: Largest tile duration in seconds
///
/// Returns:
///     List of BurstEvent
#[pyfunction]
#[pyo3(signature = (
    samples,
    delta_t,
    epoch=0.0,
    channel="",
    window_length=2048,
    window_type=PyWindowType::Tukey,
    flow=64.0,
    bandwidth=1024.0,
    confidence_threshold=10.0,
    fractional_stride=0.5,
    max_tile_bandwidth=64.0,
    max_tile_duration=0.25
))]
#[allow(clippy::too_many_arguments)]
pub fn ep_search(
    py: Python<'_>,
    samples: PyReadonlyArray1<f64>,
    delta_t: f64,
    epoch: f64,
    channel: &str,
    window_length: usize,
    window_type: PyWindowType,
    flow: f64,
    bandwidth: f64,
    confidence_threshold: f64,
    fractional_stride: f64,
    max_tile_bandwidth: f64,
    max_tile_duration: f64,
) -> PyResult<Vec<PyBurstEvent>> {
    let series = to_series(&samples, delta_t, epoch, channel)?;
    let params = SearchParams {
        window_length,
        window_type: window_type.into(),
        flow,
        bandwidth,
        confidence_threshold,
        fractional_stride,
        max_tile_bandwidth,
        max_tile_duration,
    };

    let events = py.allow_threads(|| search::ep_search(&series, &params, None))?;

    Ok(events.into_iter().map(PyBurstEvent::from).collect())
}
