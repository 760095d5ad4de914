//! Optional sink for intermediate search products
//!
//! A search hands its PSD and, for every analysis window, the extracted
//! segment and its whitened spectrum to the sink. Sink failures never affect
//! the search; the driver logs them and carries on.

use num_complex::Complex64;
use thiserror::Error;

use crate::series::{FrequencySeries, TimeSeries};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagnosticsError {
    #[error("diagnostics sink closed")]
    Closed,

    #[error("failed to write {what}: {reason}")]
    Write { what: String, reason: String },
}

/// Receiver of intermediate products
pub trait Diagnostics {
    /// Noise PSD estimated for the search
    fn psd(&mut self, psd: &FrequencySeries<f64>) -> Result<(), DiagnosticsError>;

    /// Raw segment of analysis window `index`
    fn segment(&mut self, index: usize, segment: &TimeSeries) -> Result<(), DiagnosticsError>;

    /// Whitened spectrum of analysis window `index`
    fn whitened(
        &mut self,
        index: usize,
        spectrum: &FrequencySeries<Complex64>,
    ) -> Result<(), DiagnosticsError>;
}

/// Sink that keeps copies of everything it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingDiagnostics {
    pub psds: Vec<FrequencySeries<f64>>,
    pub segments: Vec<(usize, TimeSeries)>,
    pub whitened: Vec<(usize, FrequencySeries<Complex64>)>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn psd(&mut self, psd: &FrequencySeries<f64>) -> Result<(), DiagnosticsError> {
        self.psds.push(psd.clone());
        Ok(())
    }

    fn segment(&mut self, index: usize, segment: &TimeSeries) -> Result<(), DiagnosticsError> {
        self.segments.push((index, segment.clone()));
        Ok(())
    }

    fn whitened(
        &mut self,
        index: usize,
        spectrum: &FrequencySeries<Complex64>,
    ) -> Result<(), DiagnosticsError> {
        self.whitened.push((index, spectrum.clone()));
        Ok(())
    }
}
