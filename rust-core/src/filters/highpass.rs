//! Butterworth high-pass filter built from second-order sections
//!
//! An order-n Butterworth response is the product of n/2 biquads sharing one
//! corner frequency, section k having Q = 1 / (2 sin((2k+1)π / 2n)). The
//! bilinear-transform biquads prewarp the corner, so the digital cascade has
//! the exact power response
//!
//! |H(f)|² = 1 / (1 + (tan(π fc Δt) / tan(π f Δt))^(2n))

use biquad::{Biquad, Coefficients, DirectForm2Transposed, Type};
use std::f64::consts::PI;

use crate::error::{Result, SearchError};

/// Filter order used when conditioning data
pub const CONDITIONING_ORDER: usize = 8;

/// Power response required at the pass-band edge when conditioning
pub const CONDITIONING_EDGE_RESPONSE: f64 = 0.9;

/// Forward-only Butterworth high-pass filter
pub struct ButterworthHighpass {
    sections: Vec<DirectForm2Transposed<f64>>,
    corner_hz: f64,
}

impl ButterworthHighpass {
    /// Design a filter whose -3 dB corner sits at `corner_hz`
    ///
    /// # Arguments
    /// * `order` - Filter order (even, at least 2)
    /// * `corner_hz` - Corner frequency in Hz
    /// * `sample_rate` - Sample rate in Hz
    pub fn new(order: usize, corner_hz: f64, sample_rate: f64) -> Result<Self> {
        if order < 2 || order % 2 != 0 {
            return Err(SearchError::Conditioning(format!(
                "Butterworth order must be even and at least 2 (got {order})"
            )));
        }
        if !(corner_hz > 0.0 && corner_hz < sample_rate / 2.0) {
            return Err(SearchError::Conditioning(format!(
                "high-pass corner {corner_hz} Hz outside (0, {}) Hz",
                sample_rate / 2.0
            )));
        }

        // Corner as a fraction of the Nyquist frequency
        let nyquist_fraction = corner_hz / (sample_rate / 2.0);
        let sections = (0..order / 2)
            .map(|k| {
                let q = 1.0 / (2.0 * (PI * (2 * k + 1) as f64 / (2 * order) as f64).sin());
                Coefficients::<f64>::from_normalized_params(Type::HighPass, nyquist_fraction, q)
                    .map(DirectForm2Transposed::<f64>::new)
                    .map_err(|e| {
                        SearchError::Conditioning(format!("high-pass section {k}: {e:?}"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { sections, corner_hz })
    }

    /// Design a filter whose power response at `edge_hz` equals `response`
    ///
    /// Solves the Butterworth power response for the corner:
    /// tan(π fc Δt) = tan(π f Δt) · (1/response − 1)^(1/2n)
    pub fn with_edge_response(
        order: usize,
        edge_hz: f64,
        response: f64,
        sample_rate: f64,
    ) -> Result<Self> {
        if !(response > 0.0 && response < 1.0) {
            return Err(SearchError::Conditioning(format!(
                "edge response must lie in (0, 1) (got {response})"
            )));
        }
        if !(edge_hz > 0.0 && edge_hz < sample_rate / 2.0) {
            return Err(SearchError::Conditioning(format!(
                "high-pass edge {edge_hz} Hz outside (0, {}) Hz",
                sample_rate / 2.0
            )));
        }

        let edge_warped = (PI * edge_hz / sample_rate).tan();
        let corner_warped = edge_warped * (1.0 / response - 1.0).powf(1.0 / (2 * order) as f64);
        let corner_hz = corner_warped.atan() * sample_rate / PI;

        Self::new(order, corner_hz, sample_rate)
    }

    /// Order-8 filter passing 90% of the power at `flow`
    pub fn for_conditioning(flow: f64, sample_rate: f64) -> Result<Self> {
        Self::with_edge_response(CONDITIONING_ORDER, flow, CONDITIONING_EDGE_RESPONSE, sample_rate)
    }

    pub fn corner_hz(&self) -> f64 {
        self.corner_hz
    }

    pub fn order(&self) -> usize {
        2 * self.sections.len()
    }

    /// Filter a block in place, continuing from the current state
    pub fn process_block_inplace(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self
                .sections
                .iter_mut()
                .fold(*sample, |x, section| section.run(x));
        }
    }

    /// Clear the delay lines of every section
    pub fn reset(&mut self) {
        for section in self.sections.iter_mut() {
            section.reset_state();
        }
    }
}
