//! Windowed forward transforms
//!
//! Applies the analysis window to a segment before the FFT and normalizes
//! the result so that power lost to the taper is restored.

use num_complex::Complex64;

use super::fft::FftEngine;
use crate::error::{Result, SearchError};
use crate::filters::windows::Window;
use crate::series::{FrequencySeries, TimeSeries};

/// Apply window to signal
///
/// # Arguments
/// * `signal` - Input signal
/// * `window` - Window of the same length
///
/// # Returns
/// Windowed signal
pub fn apply_window(signal: &[f64], window: &Window) -> Vec<f64> {
    signal
        .iter()
        .zip(window.coefficients().iter())
        .map(|(&s, &w)| s * w)
        .collect()
}

/// Windowed, normalized forward transform of one analysis segment
///
/// Computes X[k] = Δt · Σ w[n] x[n] e^{-2πikn/N} / √(Σw²/N). With this
/// normalization the one-sided PSD of stationary noise is
/// S[k] = 2 Δf E|X[k]|², whatever the window shape.
///
/// # Arguments
/// * `series` - Segment of exactly `window.len()` samples
/// * `window` - Analysis window
/// * `engine` - Forward plan of the same length
pub fn windowed_forward_fft(
    series: &TimeSeries,
    window: &Window,
    engine: &mut FftEngine,
) -> Result<FrequencySeries<Complex64>> {
    let n = window.len();
    if series.len() != n || engine.fft_size() != n {
        return Err(SearchError::Transform(format!(
            "segment of {} samples does not match window ({}) and plan ({}) lengths",
            series.len(),
            n,
            engine.fft_size()
        )));
    }
    if window.sum_of_squares() <= 0.0 {
        return Err(SearchError::Transform("window has zero power".into()));
    }

    let windowed = apply_window(series.data(), window);
    let scale = series.delta_t() / window.mean_square().sqrt();
    let data = engine
        .forward(&windowed)?
        .iter()
        .map(|&x| x * scale)
        .collect();

    Ok(FrequencySeries {
        name: series.name.clone(),
        epoch: series.epoch,
        f0: 0.0,
        delta_f: 1.0 / (n as f64 * series.delta_t()),
        units: format!("{} s", series.units),
        data,
    })
}
