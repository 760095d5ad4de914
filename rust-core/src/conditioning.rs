//! Data conditioning ahead of a search
//!
//! High-pass filtering, optional resampling, then removal of the samples at
//! each end that the filter and resampler transients have corrupted.

use log::{debug, info};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::{Result, SearchError};
use crate::filters::highpass::ButterworthHighpass;
use crate::series::TimeSeries;

/// Relative sample-interval mismatch below which no resampling is done
const RESAMPLE_TOLERANCE: f64 = 1e-3;

/// Conditioning configuration
#[derive(Debug, Clone)]
pub struct ConditioningParams {
    /// High-pass edge in Hz; 0 disables the filter
    pub flow: f64,

    /// Target sample interval in seconds
    pub resample_delta_t: f64,

    /// Samples dropped from each end after filtering and resampling
    pub corruption: usize,
}

impl Default for ConditioningParams {
    fn default() -> Self {
        Self {
            flow: 40.0,
            resample_delta_t: 1.0 / 4096.0,
            corruption: 0,
        }
    }
}

/// Condition `series` for an excess-power search
///
/// # Arguments
/// * `series` - Raw series, consumed
/// * `params` - Conditioning configuration
///
/// # Returns
/// The filtered, resampled and trimmed series
pub fn condition_data(mut series: TimeSeries, params: &ConditioningParams) -> Result<TimeSeries> {
    info!(
        "conditioning {}: {} samples ({} s) at epoch {}",
        series.name,
        series.len(),
        series.duration(),
        series.epoch
    );

    if params.flow > 0.0 {
        let mut filter = ButterworthHighpass::for_conditioning(params.flow, series.sample_rate())?;
        debug!(
            "high-pass: order {} corner {} Hz for {} Hz edge",
            filter.order(),
            filter.corner_hz(),
            params.flow
        );
        filter.process_block_inplace(series.data_mut());
    }

    if (params.resample_delta_t - series.delta_t()).abs() / series.delta_t() >= RESAMPLE_TOLERANCE {
        series = resample(series, params.resample_delta_t)?;
    }

    let kept = params
        .corruption
        .checked_mul(2)
        .and_then(|trimmed| series.len().checked_sub(trimmed))
        .filter(|&kept| kept > 0)
        .ok_or_else(|| {
            SearchError::Conditioning(format!(
                "trimming {} samples from each end leaves nothing of {}",
                params.corruption,
                series.len()
            ))
        })?;
    let series = series.shrink(params.corruption, kept)?;

    info!(
        "{} samples ({} s) at epoch {} remain after conditioning",
        series.len(),
        series.duration(),
        series.epoch
    );

    Ok(series)
}

/// Band-limited resampling to `delta_t`, keeping the epoch
///
/// The resampler's delay is measured by pushing an impulse through an
/// identically configured resampler and taking the energy centroid of the
/// response. That many output samples (rounded to a whole sample) are
/// dropped, so output sample i sits at epoch + i·delta_t.
pub fn resample(series: TimeSeries, delta_t: f64) -> Result<TimeSeries> {
    if !(delta_t.is_finite() && delta_t > 0.0) {
        return Err(SearchError::Conditioning(format!(
            "invalid resampling interval {delta_t}"
        )));
    }

    let ratio = series.delta_t() / delta_t;
    let expected = (series.len() as f64 * ratio).round() as usize;
    if expected == 0 {
        return Err(SearchError::Conditioning(format!(
            "resampling {} samples by {} leaves nothing",
            series.len(),
            ratio
        )));
    }

    let delay = measure_delay(series.len(), ratio)?;
    let output = run_sinc(series.data(), ratio, delay + expected)?;

    let data = output
        .get(delay..delay + expected)
        .ok_or_else(|| {
            SearchError::Conditioning(format!(
                "resampler produced {} samples, needed {}",
                output.len(),
                delay + expected
            ))
        })?
        .to_vec();

    debug!(
        "resampled {} samples at {} s to {} at {} s (delay {})",
        series.len(),
        series.delta_t(),
        data.len(),
        delta_t,
        delay
    );

    series.with_samples(delta_t, data)
}

const SINC_LEN: usize = 256;

/// Resample `input` as one chunk, flushing until at least `needed` samples exist
fn run_sinc(input: &[f64], ratio: f64, needed: usize) -> Result<Vec<f64>> {
    let params = SincInterpolationParameters {
        sinc_len: SINC_LEN,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f64>::new(ratio, 1.0, params, input.len(), 1)
        .map_err(|e| SearchError::Conditioning(format!("resampler: {e}")))?;

    let mut output = first_channel(
        resampler
            .process(&[input], None)
            .map_err(|e| SearchError::Conditioning(format!("resampling: {e}")))?,
    );
    while output.len() < needed {
        let tail = first_channel(
            resampler
                .process_partial::<&[f64]>(None, None)
                .map_err(|e| SearchError::Conditioning(format!("resampler flush: {e}")))?,
        );
        if tail.is_empty() {
            break;
        }
        output.extend(tail);
    }

    Ok(output)
}

/// Delay of the resampler in output samples for chunks of `len` samples
fn measure_delay(len: usize, ratio: f64) -> Result<usize> {
    let centre = len / 2;
    let mut impulse = vec![0.0; len];
    impulse[centre] = 1.0;

    let expected = (len as f64 * ratio).ceil() as usize;
    let margin = 8 * SINC_LEN * ratio.max(1.0).ceil() as usize;
    let response = run_sinc(&impulse, ratio, expected + margin)?;

    let (moment, energy) = response
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(moment, energy), (i, &y)| {
            (moment + i as f64 * y * y, energy + y * y)
        });
    if !(energy > 0.0 && energy.is_finite()) {
        return Err(SearchError::Conditioning(
            "resampler impulse response carries no energy".into(),
        ));
    }

    let delay = moment / energy - centre as f64 * ratio;
    if delay < -0.5 {
        return Err(SearchError::Conditioning(format!(
            "resampler reports a negative delay of {delay} samples"
        )));
    }

    Ok(delay.round().max(0.0) as usize)
}

fn first_channel(channels: Vec<Vec<f64>>) -> Vec<f64> {
    channels.into_iter().next().unwrap_or_default()
}
