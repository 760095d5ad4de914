//! FFT plans for the search
//!
//! `FftEngine` wraps a realfft forward plan for analysis windows and
//! `ChannelIfft` wraps a rustfft inverse plan sized to one channel's bins.
//! Both own their scratch buffers so the per-window loop does not allocate
//! plan state.

use num_complex::Complex64;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::error::{Result, SearchError};

/// Forward FFT engine for real-valued windows
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Reusable input buffer
    input_buffer: Vec<f64>,

    /// Reusable output buffer (complex spectrum)
    output_buffer: Vec<Complex64>,

    scratch: Vec<Complex64>,
}

impl FftEngine {
    /// Create a new forward plan
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples, must be non-zero)
    pub fn new(fft_size: usize) -> Result<Self> {
        if fft_size == 0 {
            return Err(SearchError::Allocation(
                "cannot plan a zero-length forward transform".into(),
            ));
        }

        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        let input_buffer = r2c.make_input_vec();
        let output_buffer = r2c.make_output_vec();
        let scratch = r2c.make_scratch_vec();

        Ok(Self {
            fft_size,
            r2c,
            input_buffer,
            output_buffer,
            scratch,
        })
    }

    /// Compute the forward transform of exactly `fft_size` samples
    ///
    /// # Returns
    /// Complex spectrum X[k] for k = 0..=fft_size/2 (unnormalized)
    pub fn forward(&mut self, signal: &[f64]) -> Result<&[Complex64]> {
        if signal.len() != self.fft_size {
            return Err(SearchError::Transform(format!(
                "expected {} samples, got {}",
                self.fft_size,
                signal.len()
            )));
        }

        self.input_buffer.copy_from_slice(signal);
        self.r2c
            .process_with_scratch(&mut self.input_buffer, &mut self.output_buffer, &mut self.scratch)
            .map_err(|e| SearchError::Transform(e.to_string()))?;

        Ok(&self.output_buffer)
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Get number of frequency bins (fft_size/2 + 1 for real FFT)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }
}

/// Inverse complex FFT over one channel's bins
pub struct ChannelIfft {
    size: usize,
    ifft: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
}

impl ChannelIfft {
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(SearchError::Allocation(
                "cannot plan a zero-length inverse transform".into(),
            ));
        }

        let mut planner = FftPlanner::new();
        let ifft = planner.plan_fft_inverse(size);
        let scratch = vec![Complex64::new(0.0, 0.0); ifft.get_inplace_scratch_len()];

        Ok(Self { size, ifft, scratch })
    }

    /// Inverse transform in place with unitary scaling (1/√N)
    pub fn process_unitary(&mut self, buffer: &mut [Complex64]) -> Result<()> {
        if buffer.len() != self.size {
            return Err(SearchError::Transform(format!(
                "inverse transform expects {} bins, got {}",
                self.size,
                buffer.len()
            )));
        }

        self.ifft.process_with_scratch(buffer, &mut self.scratch);

        let scale = 1.0 / (self.size as f64).sqrt();
        for value in buffer.iter_mut() {
            *value *= scale;
        }

        Ok(())
    }

    pub fn size(&self) -> usize {
        self.size
    }
}
