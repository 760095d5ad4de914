//! Channel filter bank
//!
//! One band-pass filter per time-frequency channel, applied in the frequency
//! domain to the bins of a single analysis window. Channel k covers
//! [flow + k·Δf_c, flow + (k+1)·Δf_c) and its response is flat across those
//! bins. The filter gain is chosen so that, after the projector's inverse
//! transform and window correction, each pixel of Gaussian noise has unit
//! expected energy.

use num_complex::Complex64;

use crate::error::{Result, SearchError};
use crate::series::FrequencySeries;
use crate::tfplane::TfPlane;

/// Whether the spectrum fed to the bank has already been whitened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumState {
    /// Output of `whiten`: unit expected power in every bin
    Whitened,

    /// Windowed transform only; the filters divide out the noise amplitude
    Raw,
}

/// Frequency-domain response of a single channel
#[derive(Debug, Clone)]
pub struct ChannelFilter {
    /// First FFT bin of the channel
    first_bin: usize,

    /// Per-bin gain including normalization
    response: Vec<f64>,
}

impl ChannelFilter {
    pub fn first_bin(&self) -> usize {
        self.first_bin
    }

    pub fn response(&self) -> &[f64] {
        &self.response
    }

    pub fn len(&self) -> usize {
        self.response.len()
    }

    pub fn is_empty(&self) -> bool {
        self.response.is_empty()
    }

    /// FFT bins covered by the filter
    pub fn bins(&self) -> std::ops::Range<usize> {
        self.first_bin..self.first_bin + self.response.len()
    }
}

/// Filters for every channel of a time-frequency plane
#[derive(Debug, Clone)]
pub struct ChannelFilterBank {
    filters: Vec<ChannelFilter>,
    state: SpectrumState,
}

impl ChannelFilterBank {
    /// Build one filter per channel of `plane`
    ///
    /// # Arguments
    /// * `plane` - Plane whose channel layout the bank follows
    /// * `psd` - One-sided noise PSD at the plane's FFT resolution
    /// * `state` - Whether spectra passed to `apply` are already whitened
    pub fn new(plane: &TfPlane, psd: &FrequencySeries<f64>, state: SpectrumState) -> Result<Self> {
        let bins = plane.window_length() / 2 + 1;
        if psd.len() != bins {
            return Err(SearchError::FilterConstruction(format!(
                "PSD has {} bins, plane needs {}",
                psd.len(),
                bins
            )));
        }
        if (psd.delta_f - plane.delta_f()).abs() > 1e-9 * plane.delta_f() || psd.f0 != 0.0 {
            return Err(SearchError::FilterConstruction(format!(
                "PSD resolution {} Hz from {} Hz does not match plane resolution {} Hz",
                psd.delta_f,
                psd.f0,
                plane.delta_f()
            )));
        }

        let width = plane.channel_bins();
        // Flat in-band shape, so mean |h|² = 1
        let shape = vec![1.0; width];
        let mean_square_shape = shape.iter().map(|h| h * h).sum::<f64>() / width as f64;
        let gain = plane.window().mean_square().sqrt() / mean_square_shape.sqrt();
        let two_delta_f = 2.0 * psd.delta_f;

        let mut filters = Vec::with_capacity(plane.channels());
        for channel in 0..plane.channels() {
            let first_bin = plane.first_bin() + channel * width;
            let mut response = Vec::with_capacity(width);

            for (j, &h) in shape.iter().enumerate() {
                let k = first_bin + j;
                let s = psd.data[k];
                if !(s.is_finite() && s > 0.0) {
                    return Err(SearchError::FilterConstruction(format!(
                        "PSD value {} at {} Hz in channel {}",
                        s,
                        psd.bin_frequency(k),
                        channel
                    )));
                }

                let amplitude = match state {
                    SpectrumState::Whitened => 1.0,
                    SpectrumState::Raw => (s / two_delta_f).sqrt(),
                };
                response.push(h * gain / amplitude);
            }

            filters.push(ChannelFilter { first_bin, response });
        }

        Ok(Self { filters, state })
    }

    pub fn state(&self) -> SpectrumState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn filter(&self, channel: usize) -> Option<&ChannelFilter> {
        self.filters.get(channel)
    }

    /// Multiply one channel's bins of `spectrum` by its filter into `output`
    ///
    /// `output` must hold exactly one channel's worth of bins.
    pub fn apply(&self, channel: usize, spectrum: &[Complex64], output: &mut [Complex64]) -> Result<()> {
        let filter = self.filters.get(channel).ok_or_else(|| {
            SearchError::FilterConstruction(format!(
                "channel {} out of range (bank has {})",
                channel,
                self.filters.len()
            ))
        })?;

        let bins = spectrum.get(filter.bins()).ok_or_else(|| {
            SearchError::FilterConstruction(format!(
                "spectrum of {} bins does not cover channel {} ({:?})",
                spectrum.len(),
                channel,
                filter.bins()
            ))
        })?;
        if output.len() != filter.len() {
            return Err(SearchError::FilterConstruction(format!(
                "output holds {} bins, channel {} has {}",
                output.len(),
                channel,
                filter.len()
            )));
        }

        for ((out, &x), &h) in output.iter_mut().zip(bins).zip(&filter.response) {
            *out = x * h;
        }

        Ok(())
    }
}
