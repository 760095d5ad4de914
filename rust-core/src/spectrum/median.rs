//! Median-averaged power spectral density
//!
//! Each overlapping segment yields a modified periodogram; bins are then
//! combined with the median instead of the mean, so that a handful of loud
//! segments (glitches, the bursts we are looking for) do not inflate the
//! noise estimate. For Gaussian noise the periodogram bins are exponentially
//! distributed and the median underestimates the mean by a known factor,
//! which is divided out.

use log::debug;

use super::fft::FftEngine;
use super::windowing::windowed_forward_fft;
use crate::error::{Result, SearchError};
use crate::filters::windows::Window;
use crate::series::{FrequencySeries, TimeSeries};

/// Ratio of the sample median to the mean for `n` exponential variates
///
/// β(n) = Σ_{i=1}^{n} (-1)^{i+1} / i for odd n; even n uses the value of
/// the next lower odd count. Tends to ln 2 as n grows.
pub fn median_bias(n: usize) -> f64 {
    let pairs = n.saturating_sub(1) / 2;
    (1..=pairs).fold(1.0, |bias, i| {
        bias - 1.0 / (2 * i) as f64 + 1.0 / (2 * i + 1) as f64
    })
}

/// Median of a slice (mean of the two central values for even lengths)
fn median(values: &mut [f64]) -> f64 {
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        0.5 * (values[mid - 1] + values[mid])
    } else {
        values[mid]
    }
}

/// Estimate the one-sided PSD of `series` by median-averaging periodograms
///
/// # Arguments
/// * `series` - Conditioned input series
/// * `window_length` - Segment length in samples
/// * `window_shift` - Stride between segments in samples (1..=window_length)
/// * `window` - Taper applied to each segment
/// * `engine` - Forward plan of `window_length` samples
///
/// # Returns
/// PSD with `window_length/2 + 1` bins, in units²/Hz
pub fn average_spectrum_median(
    series: &TimeSeries,
    window_length: usize,
    window_shift: usize,
    window: &Window,
    engine: &mut FftEngine,
) -> Result<FrequencySeries<f64>> {
    if window_length == 0 || window.len() != window_length || engine.fft_size() != window_length {
        return Err(SearchError::SpectrumEstimation(format!(
            "window length {} does not match window ({}) and plan ({})",
            window_length,
            window.len(),
            engine.fft_size()
        )));
    }
    if window_shift == 0 || window_shift > window_length {
        return Err(SearchError::SpectrumEstimation(format!(
            "window shift {window_shift} must lie in 1..={window_length}"
        )));
    }
    if series.len() < window_length {
        return Err(SearchError::SpectrumEstimation(format!(
            "series of {} samples holds no complete {}-sample segment",
            series.len(),
            window_length
        )));
    }

    let segments = (series.len() - window_length) / window_shift + 1;
    let bins = engine.num_bins();
    let delta_f = 1.0 / (window_length as f64 * series.delta_t());
    debug!(
        "median PSD: {} segments of {} samples, shift {}",
        segments, window_length, window_shift
    );

    // periodograms[k * segments + s] = power in bin k of segment s
    let mut periodograms = vec![0.0; bins * segments];
    for s in 0..segments {
        let segment = series.cut(s * window_shift, window_length)?;
        let spectrum = windowed_forward_fft(&segment, window, engine)?;
        for (k, x) in spectrum.data.iter().enumerate() {
            periodograms[k * segments + s] = 2.0 * delta_f * x.norm_sqr();
        }
    }

    let bias = median_bias(segments);
    let data = periodograms
        .chunks_mut(segments)
        .map(|bin| median(bin) / bias)
        .collect();

    Ok(FrequencySeries {
        name: format!("{} PSD", series.name),
        epoch: series.epoch,
        f0: 0.0,
        delta_f,
        units: format!("{}^2 Hz^-1", series.units),
        data,
    })
}
