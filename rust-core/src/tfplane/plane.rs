//! Time-frequency plane geometry and pixel store
//!
//! The plane splits the analysed band into `channels` adjacent channels of
//! `channel_bins` FFT bins each. Inverse-transforming one channel's bins
//! gives `channel_bins` complex pixels spread evenly over the analysis
//! window, one every `1 / channel_bandwidth` seconds. Larger tiles are sums
//! of whole channels and whole pixels, so one filter bank serves every tile
//! shape.

use ndarray::Array2;
use num_complex::Complex64;

use super::tiling::Tiles;
use crate::error::{Result, SearchError};
use crate::filters::windows::{Window, WindowType};

/// Relative slack when comparing derived sizes against configured limits
const TOLERANCE: f64 = 1e-9;

/// Parameters for building a time-frequency plane
#[derive(Debug, Clone)]
pub struct PlaneParams {
    /// Analysis window length in samples (even)
    pub window_length: usize,

    /// Sample interval of the analysed series in seconds
    pub delta_t: f64,

    /// Low edge of the analysed band in Hz
    pub flow: f64,

    /// Width of the analysed band in Hz
    pub bandwidth: f64,

    /// Window shift as a fraction of the window length (0, 1]
    pub fractional_stride: f64,

    /// Largest tile bandwidth in Hz
    pub max_tile_bandwidth: f64,

    /// Largest tile duration in seconds
    pub max_tile_duration: f64,

    /// Shape of the analysis window
    pub window_type: WindowType,
}

/// Time-frequency plane for one analysis window
#[derive(Debug, Clone)]
pub struct TfPlane {
    window_length: usize,
    window_shift: usize,
    delta_t: f64,

    /// FFT bin spacing 1 / (N Δt)
    delta_f: f64,

    /// FFT bin at which channel 0 starts
    first_bin: usize,

    /// Low edge of channel 0, aligned to an FFT bin
    flow: f64,

    channels: usize,
    channel_bins: usize,

    max_tile_bandwidth: f64,
    max_tile_duration: f64,
    max_tile_channels: usize,
    max_tile_pixels: usize,

    /// Pixels [tiling_start, tiling_end) lie inside the window's flat part
    tiling_start: usize,
    tiling_end: usize,

    window: Window,

    /// Per-pixel inverse of the window value at the pixel centre
    pixel_correction: Vec<f64>,

    /// channels × channel_bins complex pixels
    pixels: Array2<Complex64>,
}

fn exceeds(value: f64, limit: f64) -> bool {
    value > limit * (1.0 + TOLERANCE)
}

impl TfPlane {
    /// Build the plane geometry and its analysis window
    pub fn new(params: &PlaneParams) -> Result<Self> {
        let n = params.window_length;
        if n < 2 || n % 2 != 0 {
            return Err(SearchError::Allocation(format!(
                "window length must be even and at least 2 (got {n})"
            )));
        }
        if !(params.delta_t.is_finite() && params.delta_t > 0.0) {
            return Err(SearchError::Allocation(format!(
                "invalid sample interval {}",
                params.delta_t
            )));
        }
        for (name, value) in [
            ("bandwidth", params.bandwidth),
            ("maximum tile bandwidth", params.max_tile_bandwidth),
            ("maximum tile duration", params.max_tile_duration),
            ("fractional stride", params.fractional_stride),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SearchError::Allocation(format!("{name} must be positive (got {value})")));
            }
        }
        if !(params.flow.is_finite() && params.flow >= 0.0) {
            return Err(SearchError::Allocation(format!(
                "low frequency must be non-negative (got {})",
                params.flow
            )));
        }

        let nyquist = 0.5 / params.delta_t;
        if exceeds(params.flow + params.bandwidth, nyquist) {
            return Err(SearchError::Allocation(format!(
                "band [{}, {}) Hz extends beyond the Nyquist frequency {} Hz",
                params.flow,
                params.flow + params.bandwidth,
                nyquist
            )));
        }

        let window_shift = (params.fractional_stride * n as f64).round() as usize;
        if window_shift == 0 || window_shift > n {
            return Err(SearchError::Allocation(format!(
                "window shift {window_shift} must lie in 1..={n} (fractional stride {})",
                params.fractional_stride
            )));
        }

        let delta_f = 1.0 / (n as f64 * params.delta_t);
        let flat_start = (n - window_shift) / 2;
        let flat_end = flat_start + window_shift;

        let channel_bins = choose_channel_bins(params, delta_f, flat_start, flat_end).ok_or_else(|| {
            SearchError::Allocation(format!(
                "no channel width fits a {} Hz band with tiles up to {} Hz × {} s in a {}-sample window",
                params.bandwidth, params.max_tile_bandwidth, params.max_tile_duration, n
            ))
        })?;
        let channel_bandwidth = channel_bins as f64 * delta_f;
        let pixel_spacing = n / channel_bins;
        let pixel_duration = pixel_spacing as f64 * params.delta_t;

        // Both are bounded by n / 2 once the band lies below Nyquist
        let channels = (params.bandwidth / channel_bandwidth * (1.0 + TOLERANCE)).floor() as usize;
        let first_bin = (params.flow / delta_f).round() as usize;
        if first_bin + channels * channel_bins > n / 2 {
            return Err(SearchError::Allocation(format!(
                "band [{}, {}) Hz extends beyond the Nyquist frequency {} Hz",
                params.flow,
                params.flow + params.bandwidth,
                nyquist
            )));
        }

        let tiling_start = (flat_start + pixel_spacing - 1) / pixel_spacing;
        let tiling_end = flat_end / pixel_spacing;

        let max_tile_channels = ((params.max_tile_bandwidth / channel_bandwidth * (1.0 + TOLERANCE))
            .floor() as usize)
            .min(channels);
        let max_tile_pixels = ((params.max_tile_duration / pixel_duration * (1.0 + TOLERANCE))
            .floor() as usize)
            .min(tiling_end - tiling_start);

        let window = Window::new(params.window_type, n, window_shift);
        let mut pixel_correction = vec![1.0; channel_bins];
        for (m, correction) in pixel_correction
            .iter_mut()
            .enumerate()
            .take(tiling_end)
            .skip(tiling_start)
        {
            let centre = m * pixel_spacing + pixel_spacing / 2;
            let w = window.coefficients()[centre.min(n - 1)];
            if w <= 0.0 {
                return Err(SearchError::Allocation(format!(
                    "analysis window vanishes at sample {centre} inside the tiling region"
                )));
            }
            *correction = 1.0 / w;
        }

        Ok(Self {
            window_length: n,
            window_shift,
            delta_t: params.delta_t,
            delta_f,
            first_bin,
            flow: first_bin as f64 * delta_f,
            channels,
            channel_bins,
            max_tile_bandwidth: params.max_tile_bandwidth,
            max_tile_duration: params.max_tile_duration,
            max_tile_channels,
            max_tile_pixels,
            tiling_start,
            tiling_end,
            window,
            pixel_correction,
            pixels: Array2::zeros((channels, channel_bins)),
        })
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    /// Stride between consecutive analysis windows in samples
    pub fn window_shift(&self) -> usize {
        self.window_shift
    }

    pub fn delta_t(&self) -> f64 {
        self.delta_t
    }

    /// FFT bin spacing in Hz
    pub fn delta_f(&self) -> f64 {
        self.delta_f
    }

    pub fn first_bin(&self) -> usize {
        self.first_bin
    }

    /// Low edge of the tiled band in Hz
    pub fn flow(&self) -> f64 {
        self.flow
    }

    /// Upper edge of the tiled band in Hz
    pub fn fhigh(&self) -> f64 {
        self.flow + self.channels as f64 * self.channel_bandwidth()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// FFT bins per channel (also the number of pixels per channel)
    pub fn channel_bins(&self) -> usize {
        self.channel_bins
    }

    pub fn channel_bandwidth(&self) -> f64 {
        self.channel_bins as f64 * self.delta_f
    }

    /// Samples between consecutive pixels
    pub fn pixel_spacing(&self) -> usize {
        self.window_length / self.channel_bins
    }

    /// Base time resolution, 1 / channel_bandwidth
    pub fn pixel_duration(&self) -> f64 {
        self.pixel_spacing() as f64 * self.delta_t
    }

    pub fn max_tile_bandwidth(&self) -> f64 {
        self.max_tile_bandwidth
    }

    pub fn max_tile_duration(&self) -> f64 {
        self.max_tile_duration
    }

    pub fn max_tile_channels(&self) -> usize {
        self.max_tile_channels
    }

    pub fn max_tile_pixels(&self) -> usize {
        self.max_tile_pixels
    }

    /// Half-open pixel range covered by tiles
    pub fn tiling_range(&self) -> std::ops::Range<usize> {
        self.tiling_start..self.tiling_end
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn pixel_correction(&self) -> &[f64] {
        &self.pixel_correction
    }

    pub fn pixels(&self) -> &Array2<Complex64> {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut Array2<Complex64> {
        &mut self.pixels
    }

    /// Every admissible tile, generated lazily
    pub fn tiles(&self) -> Tiles {
        Tiles::new(
            self.channels,
            self.max_tile_channels,
            self.max_tile_pixels,
            self.tiling_range(),
        )
    }
}

/// Pick the channel width in FFT bins
///
/// Candidates are powers of two dividing the window length. A candidate is
/// admissible when its bandwidth fits the tile and band limits and its base
/// duration fits the tile limit and leaves at least one whole pixel in the
/// window's flat part. Of those, the one closest (in log₂) to
/// √(max_tile_bandwidth / max_tile_duration) wins, balancing the number of
/// tile bandwidths against the number of tile durations.
fn choose_channel_bins(
    params: &PlaneParams,
    delta_f: f64,
    flat_start: usize,
    flat_end: usize,
) -> Option<usize> {
    let n = params.window_length;
    let target = ((params.max_tile_bandwidth / params.max_tile_duration).sqrt() / delta_f).log2();

    std::iter::successors(Some(1usize), |&w| w.checked_mul(2))
        .take_while(|&w| w <= n / 2)
        .filter(|&w| n % w == 0)
        .filter(|&w| {
            let bandwidth = w as f64 * delta_f;
            let spacing = n / w;
            let duration = spacing as f64 * params.delta_t;
            let flat_pixels = (flat_end / spacing).saturating_sub((flat_start + spacing - 1) / spacing);

            !exceeds(bandwidth, params.max_tile_bandwidth)
                && !exceeds(bandwidth, params.bandwidth)
                && !exceeds(duration, params.max_tile_duration)
                && flat_pixels >= 1
        })
        .min_by(|&a, &b| {
            let da = ((a as f64).log2() - target).abs();
            let db = ((b as f64).log2() - target).abs();
            da.total_cmp(&db)
        })
}
