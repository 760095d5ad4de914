//! Projection of a windowed spectrum onto the time-frequency plane
//!
//! Each channel's filtered bins are inverse-transformed into a complex time
//! series with one sample per pixel. The bins are first rotated by half a
//! bin-to-pixel phase step so that pixel m is centred on sample
//! (m + ½)·N/w of the analysis window and covers [m·N/w, (m+1)·N/w).

use num_complex::Complex64;
use std::f64::consts::PI;

use super::plane::TfPlane;
use crate::error::{Result, SearchError};
use crate::filters::channel::ChannelFilterBank;
use crate::series::FrequencySeries;
use crate::spectrum::fft::ChannelIfft;

/// Reusable inverse-transform state for one plane geometry
pub struct Projector {
    ifft: ChannelIfft,

    /// One channel's bins, transformed in place
    buffer: Vec<Complex64>,

    /// e^{iπj/w} for j = 0..w
    phase: Vec<Complex64>,
}

impl Projector {
    pub fn new(plane: &TfPlane) -> Result<Self> {
        let width = plane.channel_bins();
        let ifft = ChannelIfft::new(width)?;
        let phase = (0..width)
            .map(|j| Complex64::from_polar(1.0, PI * j as f64 / width as f64))
            .collect();

        Ok(Self {
            ifft,
            buffer: vec![Complex64::new(0.0, 0.0); width],
            phase,
        })
    }

    /// Fill the plane's pixels from one window's spectrum
    ///
    /// # Arguments
    /// * `plane` - Plane receiving the pixels
    /// * `spectrum` - Windowed transform of the analysis window, whitened or
    ///   raw to match the bank
    /// * `bank` - Channel filters built for `plane`
    pub fn project(
        &mut self,
        plane: &mut TfPlane,
        spectrum: &FrequencySeries<Complex64>,
        bank: &ChannelFilterBank,
    ) -> Result<()> {
        let width = plane.channel_bins();
        if self.ifft.size() != width {
            return Err(SearchError::Transform(format!(
                "projector planned for {}-bin channels, plane has {}",
                self.ifft.size(),
                width
            )));
        }
        if spectrum.len() != plane.window_length() / 2 + 1 {
            return Err(SearchError::Transform(format!(
                "spectrum has {} bins, plane expects {}",
                spectrum.len(),
                plane.window_length() / 2 + 1
            )));
        }
        if bank.len() != plane.channels() {
            return Err(SearchError::Transform(format!(
                "filter bank has {} channels, plane has {}",
                bank.len(),
                plane.channels()
            )));
        }

        for channel in 0..plane.channels() {
            bank.apply(channel, &spectrum.data, &mut self.buffer)?;
            for (x, &p) in self.buffer.iter_mut().zip(&self.phase) {
                *x *= p;
            }
            self.ifft.process_unitary(&mut self.buffer)?;

            for (x, &correction) in self.buffer.iter_mut().zip(plane.pixel_correction()) {
                *x *= correction;
            }
            plane
                .pixels_mut()
                .row_mut(channel)
                .iter_mut()
                .zip(&self.buffer)
                .for_each(|(pixel, &x)| *pixel = x);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::channel::SpectrumState;
    use crate::filters::windows::WindowType;
    use crate::series::TimeSeries;
    use crate::spectrum::{whiten, windowed_forward_fft, FftEngine};
    use crate::tfplane::PlaneParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    const N: usize = 256;
    const DT: f64 = 1.0 / 256.0;

    fn plane(window_type: WindowType) -> TfPlane {
        TfPlane::new(&PlaneParams {
            window_length: N,
            delta_t: DT,
            flow: 16.0,
            bandwidth: 64.0,
            fractional_stride: 0.5,
            max_tile_bandwidth: 32.0,
            max_tile_duration: 0.125,
            window_type,
        })
        .unwrap()
    }

    /// Exact PSD of unit-variance white noise
    fn white_psd() -> FrequencySeries<f64> {
        FrequencySeries {
            name: "PSD".into(),
            epoch: 0.0,
            f0: 0.0,
            delta_f: 1.0 / (N as f64 * DT),
            units: String::new(),
            data: vec![2.0 * DT; N / 2 + 1],
        }
    }

    fn project(plane: &mut TfPlane, samples: Vec<f64>) {
        let psd = white_psd();
        let series = TimeSeries::new("H1:TEST", 0.0, DT, "strain", samples).unwrap();
        let mut engine = FftEngine::new(N).unwrap();
        let mut spectrum = windowed_forward_fft(&series, plane.window(), &mut engine).unwrap();
        whiten(&mut spectrum, &psd, plane.flow(), plane.fhigh()).unwrap();

        let bank = ChannelFilterBank::new(plane, &psd, SpectrumState::Whitened).unwrap();
        let mut projector = Projector::new(plane).unwrap();
        projector.project(plane, &spectrum, &bank).unwrap();
    }

    fn mean_pixel_energy(window_type: WindowType, trials: usize) -> f64 {
        let mut plane = plane(window_type);
        let mut rng = StdRng::seed_from_u64(99);
        let normal = Normal::new(0.0, 1.0).unwrap();

        let mut total = 0.0;
        let mut count = 0usize;
        for _ in 0..trials {
            let samples = (0..N).map(|_| normal.sample(&mut rng)).collect();
            project(&mut plane, samples);
            for row in plane.pixels().rows() {
                for m in plane.tiling_range() {
                    total += row[m].norm_sqr();
                    count += 1;
                }
            }
        }
        total / count as f64
    }

    #[test]
    fn test_geometry() {
        let plane = plane(WindowType::Tukey);
        assert_eq!(plane.channel_bins(), 16);
        assert_eq!(plane.channels(), 4);
        assert_eq!(plane.tiling_range(), 4..12);
    }

    #[test]
    fn test_unit_pixel_energy_rectangular() {
        let mean = mean_pixel_energy(WindowType::Rectangular, 400);
        assert!((mean - 1.0).abs() < 0.05, "mean pixel energy {}", mean);
    }

    #[test]
    fn test_unit_pixel_energy_tukey() {
        // Some energy leaks into the tapers at the edges of the flat part
        let mean = mean_pixel_energy(WindowType::Tukey, 400);
        assert!(mean > 0.85 && mean < 1.05, "mean pixel energy {}", mean);
    }

    #[test]
    fn test_impulse_lands_in_its_pixel() {
        let mut plane = plane(WindowType::Tukey);
        let spacing = plane.pixel_spacing();

        for &n0 in &[70usize, 100, 135, 190] {
            let mut samples = vec![0.0; N];
            samples[n0] = 1.0;
            project(&mut plane, samples);

            let row = plane.pixels().row(1);
            let loudest = (0..row.len())
                .max_by(|&a, &b| row[a].norm_sqr().total_cmp(&row[b].norm_sqr()))
                .unwrap();
            assert_eq!(loudest, n0 / spacing, "impulse at sample {}", n0);
        }
    }

    #[test]
    fn test_rejects_mismatched_spectrum() {
        let mut plane = plane(WindowType::Tukey);
        let psd = white_psd();
        let bank = ChannelFilterBank::new(&plane, &psd, SpectrumState::Whitened).unwrap();
        let mut projector = Projector::new(&plane).unwrap();

        let short = FrequencySeries {
            name: "X".into(),
            epoch: 0.0,
            f0: 0.0,
            delta_f: 1.0,
            units: String::new(),
            data: vec![Complex64::new(0.0, 0.0); 64],
        };
        assert!(matches!(
            projector.project(&mut plane, &short, &bank),
            Err(SearchError::Transform(_))
        ));
    }
}
