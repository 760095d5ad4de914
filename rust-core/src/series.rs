//! Sampled time and frequency series
//!
//! Both carry their own sampling metadata so that stages never have to be
//! told the sample rate or resolution separately.

use crate::error::{Result, SearchError};

/// Uniformly sampled real time series
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    /// Channel name, copied onto events found in this series
    pub name: String,

    /// GPS time of the first sample in seconds
    pub epoch: f64,

    /// Sample interval in seconds
    delta_t: f64,

    /// Units of the samples (e.g. "strain")
    pub units: String,

    data: Vec<f64>,
}

impl TimeSeries {
    /// Create a new time series
    ///
    /// # Arguments
    /// * `name` - Channel name
    /// * `epoch` - GPS start time in seconds
    /// * `delta_t` - Sample interval in seconds (must be positive and finite)
    /// * `units` - Units tag
    /// * `data` - Samples (at least one)
    pub fn new(
        name: impl Into<String>,
        epoch: f64,
        delta_t: f64,
        units: impl Into<String>,
        data: Vec<f64>,
    ) -> Result<Self> {
        if !(delta_t.is_finite() && delta_t > 0.0) {
            return Err(SearchError::Allocation(format!(
                "invalid sample interval {delta_t}"
            )));
        }
        if data.is_empty() {
            return Err(SearchError::Allocation(
                "time series must hold at least one sample".into(),
            ));
        }

        Ok(Self {
            name: name.into(),
            epoch,
            delta_t,
            units: units.into(),
            data,
        })
    }

    pub fn delta_t(&self) -> f64 {
        self.delta_t
    }

    pub fn sample_rate(&self) -> f64 {
        1.0 / self.delta_t
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a constructed series; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Duration covered by the samples in seconds
    pub fn duration(&self) -> f64 {
        self.data.len() as f64 * self.delta_t
    }

    /// Copy `length` samples starting at `first` into a new series
    ///
    /// The epoch of the new series is advanced by `first * delta_t`.
    pub fn cut(&self, first: usize, length: usize) -> Result<TimeSeries> {
        let end = first
            .checked_add(length)
            .filter(|&end| end <= self.data.len() && length > 0)
            .ok_or_else(|| {
                SearchError::Allocation(format!(
                    "cannot cut {length} samples at offset {first} from a series of {}",
                    self.data.len()
                ))
            })?;

        Ok(TimeSeries {
            name: self.name.clone(),
            epoch: self.epoch + first as f64 * self.delta_t,
            delta_t: self.delta_t,
            units: self.units.clone(),
            data: self.data[first..end].to_vec(),
        })
    }

    /// Consume the series, keeping `length` samples starting at `first`
    pub fn shrink(mut self, first: usize, length: usize) -> Result<TimeSeries> {
        match first.checked_add(length) {
            Some(end) if length > 0 && end <= self.data.len() => {
                self.data.truncate(end);
                self.data.drain(..first);
                self.epoch += first as f64 * self.delta_t;
                Ok(self)
            }
            _ => Err(SearchError::Allocation(format!(
                "cannot keep {length} samples at offset {first} of a series of {}",
                self.data.len()
            ))),
        }
    }

    /// Replace the samples and the sample interval in one step
    ///
    /// Used by stages that change the sampling (resampling) so that length
    /// and interval can never get out of step.
    pub(crate) fn with_samples(self, delta_t: f64, data: Vec<f64>) -> Result<TimeSeries> {
        TimeSeries::new(self.name, self.epoch, delta_t, self.units, data)
    }
}

/// Uniformly spaced frequency-domain series
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencySeries<T> {
    pub name: String,

    /// GPS time the spectrum refers to
    pub epoch: f64,

    /// Frequency of the first bin in Hz
    pub f0: f64,

    /// Bin spacing in Hz
    pub delta_f: f64,

    pub units: String,

    pub data: Vec<T>,
}

impl<T> FrequencySeries<T> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Index of the bin containing `frequency`, rounded to the nearest bin
    pub fn bin_index(&self, frequency: f64) -> isize {
        ((frequency - self.f0) / self.delta_f).round() as isize
    }

    /// Centre frequency of bin `k` in Hz
    pub fn bin_frequency(&self, k: usize) -> f64 {
        self.f0 + k as f64 * self.delta_f
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> TimeSeries {
        let data = (0..n).map(|i| i as f64).collect();
        TimeSeries::new("H1:TEST", 1000.0, 0.25, "strain", data).unwrap()
    }

    #[test]
    fn test_rejects_invalid_sampling() {
        assert!(TimeSeries::new("x", 0.0, 0.0, "", vec![1.0]).is_err());
        assert!(TimeSeries::new("x", 0.0, f64::NAN, "", vec![1.0]).is_err());
        assert!(TimeSeries::new("x", 0.0, 1.0, "", vec![]).is_err());
    }

    #[test]
    fn test_cut_advances_epoch() {
        let series = ramp(16);
        let cut = series.cut(4, 8).unwrap();

        assert_eq!(cut.len(), 8);
        assert_eq!(cut.data()[0], 4.0);
        assert!((cut.epoch - 1001.0).abs() < 1e-12);
        assert_eq!(series.len(), 16);
    }

    #[test]
    fn test_cut_out_of_range() {
        let series = ramp(16);
        assert!(series.cut(10, 7).is_err());
        assert!(series.cut(0, 0).is_err());
        assert!(series.cut(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_shrink() {
        let series = ramp(10).shrink(2, 6).unwrap();

        assert_eq!(series.data(), &[2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert!((series.epoch - 1000.5).abs() < 1e-12);
        assert!((series.duration() - 1.5).abs() < 1e-12);

        assert!(ramp(10).shrink(5, 6).is_err());
    }
}
