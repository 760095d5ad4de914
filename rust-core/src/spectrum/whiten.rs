//! Whitening against the noise PSD

use num_complex::Complex64;

use crate::error::{Result, SearchError};
use crate::series::FrequencySeries;

/// Whiten `spectrum` in place over `[flow, fhigh)`
///
/// Every bin in the band is divided by the local noise amplitude
/// √(S[k] / (2 Δf)), giving unit expected |X[k]|² under the noise-only
/// hypothesis. Bins outside the band are zeroed.
///
/// # Arguments
/// * `spectrum` - Output of `windowed_forward_fft`
/// * `psd` - One-sided PSD with the same resolution and length
/// * `flow` - Lower edge of the band in Hz
/// * `fhigh` - Upper edge of the band in Hz (exclusive)
pub fn whiten(
    spectrum: &mut FrequencySeries<Complex64>,
    psd: &FrequencySeries<f64>,
    flow: f64,
    fhigh: f64,
) -> Result<()> {
    if psd.len() != spectrum.len() {
        return Err(SearchError::Whitening(format!(
            "PSD has {} bins but the spectrum has {}",
            psd.len(),
            spectrum.len()
        )));
    }
    if (psd.delta_f - spectrum.delta_f).abs() > 1e-9 * spectrum.delta_f || psd.f0 != spectrum.f0 {
        return Err(SearchError::Whitening(format!(
            "PSD resolution {} Hz from {} Hz does not match spectrum resolution {} Hz from {} Hz",
            psd.delta_f, psd.f0, spectrum.delta_f, spectrum.f0
        )));
    }

    let low = spectrum.bin_index(flow);
    let high = spectrum.bin_index(fhigh);
    if !(flow < fhigh) || low < 0 || high as usize > spectrum.len() {
        return Err(SearchError::Whitening(format!(
            "band [{flow}, {fhigh}) Hz outside the spectrum [{}, {}) Hz",
            spectrum.f0,
            spectrum.bin_frequency(spectrum.len())
        )));
    }
    let (low, high) = (low as usize, high as usize);

    if let Some(k) = psd.data[low..high]
        .iter()
        .position(|&s| !(s.is_finite() && s > 0.0))
    {
        return Err(SearchError::Whitening(format!(
            "PSD value {} at {} Hz cannot whiten",
            psd.data[low + k],
            psd.bin_frequency(low + k)
        )));
    }

    let two_delta_f = 2.0 * spectrum.delta_f;
    for (k, (x, &s)) in spectrum.data.iter_mut().zip(psd.data.iter()).enumerate() {
        if k < low || k >= high {
            *x = Complex64::new(0.0, 0.0);
        } else {
            *x /= (s / two_delta_f).sqrt();
        }
    }

    spectrum.units = "dimensionless".into();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::windows::{Window, WindowType};
    use crate::series::TimeSeries;
    use crate::spectrum::fft::FftEngine;
    use crate::spectrum::median::average_spectrum_median;
    use crate::spectrum::windowing::windowed_forward_fft;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    fn flat_psd(bins: usize, delta_f: f64, level: f64) -> FrequencySeries<f64> {
        FrequencySeries {
            name: "PSD".into(),
            epoch: 0.0,
            f0: 0.0,
            delta_f,
            units: String::new(),
            data: vec![level; bins],
        }
    }

    fn spectrum(bins: usize, delta_f: f64) -> FrequencySeries<Complex64> {
        FrequencySeries {
            name: "X".into(),
            epoch: 0.0,
            f0: 0.0,
            delta_f,
            units: String::new(),
            data: vec![Complex64::new(1.0, 1.0); bins],
        }
    }

    #[test]
    fn test_band_restriction() {
        let mut x = spectrum(65, 1.0);
        let psd = flat_psd(65, 1.0, 2.0);
        whiten(&mut x, &psd, 10.0, 20.0).unwrap();

        assert_eq!(x.data[9], Complex64::new(0.0, 0.0));
        assert_eq!(x.data[20], Complex64::new(0.0, 0.0));
        // S / 2Δf = 1 so in-band bins are unchanged
        assert_eq!(x.data[10], Complex64::new(1.0, 1.0));
        assert_eq!(x.data[19], Complex64::new(1.0, 1.0));
    }

    #[test]
    fn test_rejects_mismatch() {
        let psd = flat_psd(65, 1.0, 1.0);

        let mut x = spectrum(33, 1.0);
        assert!(matches!(whiten(&mut x, &psd, 1.0, 10.0), Err(SearchError::Whitening(_))));

        let mut x = spectrum(65, 2.0);
        assert!(whiten(&mut x, &psd, 1.0, 10.0).is_err());

        let mut x = spectrum(65, 1.0);
        assert!(whiten(&mut x, &psd, 10.0, 100.0).is_err());
        assert!(whiten(&mut x, &psd, 20.0, 10.0).is_err());

        let mut zero = flat_psd(65, 1.0, 1.0);
        zero.data[15] = 0.0;
        assert!(whiten(&mut x, &zero, 10.0, 20.0).is_err());
    }

    #[test]
    fn test_white_noise_whitens_to_unit_variance() {
        let n = 512;
        let dt = 1.0 / 2048.0;
        let sigma = 3.0;
        let mut rng = StdRng::seed_from_u64(42);
        let normal = Normal::new(0.0, sigma).unwrap();
        let mut noise = |len: usize| -> TimeSeries {
            let data = (0..len).map(|_| normal.sample(&mut rng)).collect();
            TimeSeries::new("H1:NOISE", 0.0, dt, "strain", data).unwrap()
        };

        let window = Window::new(WindowType::Tukey, n, n / 2);
        let mut engine = FftEngine::new(n).unwrap();
        let psd = average_spectrum_median(&noise(64 * n), n, n / 2, &window, &mut engine).unwrap();

        let mut total = 0.0;
        let mut count = 0usize;
        for _ in 0..20 {
            let segment = noise(n);
            let mut x = windowed_forward_fft(&segment, &window, &mut engine).unwrap();
            whiten(&mut x, &psd, 40.0, 1000.0).unwrap();
            for bin in &x.data[10..250] {
                total += bin.norm_sqr();
                count += 1;
            }
        }

        let mean = total / count as f64;
        assert!((mean - 1.0).abs() < 0.1, "mean whitened power = {}", mean);
    }
}
