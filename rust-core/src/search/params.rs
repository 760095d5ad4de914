//! Search configuration

use crate::filters::windows::WindowType;
use crate::tfplane::PlaneParams;

/// Parameters of one excess-power search
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Analysis window length in samples (even)
    pub window_length: usize,

    /// Analysis window shape
    pub window_type: WindowType,

    /// Low edge of the searched band in Hz
    pub flow: f64,

    /// Width of the searched band in Hz
    pub bandwidth: f64,

    /// Minimum confidence (−ln Q) for a tile to be reported
    pub confidence_threshold: f64,

    /// Window shift as a fraction of the window length
    pub fractional_stride: f64,

    /// Largest tile bandwidth in Hz
    pub max_tile_bandwidth: f64,

    /// Largest tile duration in seconds
    pub max_tile_duration: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            window_length: 2048,
            window_type: WindowType::Tukey,
            flow: 64.0,
            bandwidth: 1024.0,
            confidence_threshold: 10.0,
            fractional_stride: 0.5,
            max_tile_bandwidth: 64.0,
            max_tile_duration: 0.25,
        }
    }
}

impl SearchParams {
    /// Plane parameters for a series sampled every `delta_t` seconds
    pub fn plane_params(&self, delta_t: f64) -> PlaneParams {
        PlaneParams {
            window_length: self.window_length,
            delta_t,
            flow: self.flow,
            bandwidth: self.bandwidth,
            fractional_stride: self.fractional_stride,
            max_tile_bandwidth: self.max_tile_bandwidth,
            max_tile_duration: self.max_tile_duration,
            window_type: self.window_type,
        }
    }
}
