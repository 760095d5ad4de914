//! Tapering windows for spectral analysis
//!
//! The analysis window doubles as the power normalization reference: its
//! sum of squares tells the periodogram and whitening code how much noise
//! power the taper removed.

use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    /// Tukey (tapered cosine) window: flat centre with raised-cosine edges.
    /// The flat length is supplied when the window is built; the search
    /// makes it equal to the window shift so consecutive flat parts abut.
    Tukey,

    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    /// Sidelobe attenuation: ~44 dB
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    /// Sidelobe attenuation: ~53 dB
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    /// Sidelobe attenuation: ~74 dB
    Blackman,

    /// Rectangular window (no tapering)
    Rectangular,
}

impl Default for WindowType {
    fn default() -> Self {
        WindowType::Tukey
    }
}

/// Generate window coefficients
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (M)
/// * `flat_length` - Length of the untapered centre; only used by Tukey
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..M-1
pub fn generate_window(window_type: WindowType, length: usize, flat_length: usize) -> Vec<f64> {
    if length < 2 {
        return vec![1.0; length];
    }

    let m = length as f64;
    let mut window = Vec::with_capacity(length);

    match window_type {
        WindowType::Tukey => {
            let flat_length = flat_length.min(length);
            // Tapers on each side; an odd remainder goes to the trailing edge
            let leading = (length - flat_length) / 2;
            let trailing = length - flat_length - leading;

            for n in 0..leading {
                let angle = PI * (n as f64 + 0.5) / leading as f64;
                window.push(0.5 - 0.5 * angle.cos());
            }
            window.resize(leading + flat_length, 1.0);
            for n in 0..trailing {
                let angle = PI * (n as f64 + 0.5) / trailing as f64;
                window.push(0.5 + 0.5 * angle.cos());
            }
        }

        WindowType::Hann => {
            for n in 0..length {
                let angle = 2.0 * PI * n as f64 / (m - 1.0);
                window.push(0.5 - 0.5 * angle.cos());
            }
        }

        WindowType::Hamming => {
            for n in 0..length {
                let angle = 2.0 * PI * n as f64 / (m - 1.0);
                window.push(0.54 - 0.46 * angle.cos());
            }
        }

        WindowType::Blackman => {
            for n in 0..length {
                let angle1 = 2.0 * PI * n as f64 / (m - 1.0);
                let angle2 = 4.0 * PI * n as f64 / (m - 1.0);
                // Clamp the tiny negative rounding error at the endpoints
                window.push((0.42 - 0.5 * angle1.cos() + 0.08 * angle2.cos()).max(0.0));
            }
        }

        WindowType::Rectangular => {
            window.resize(length, 1.0);
        }
    }

    window
}

/// Window coefficients together with their sum of squares
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    window_type: WindowType,
    coefficients: Vec<f64>,
    sum_of_squares: f64,
}

impl Window {
    /// Build a window of `length` samples
    ///
    /// `flat_length` is the untapered centre for a Tukey window and is
    /// ignored by the other shapes.
    pub fn new(window_type: WindowType, length: usize, flat_length: usize) -> Self {
        let coefficients = generate_window(window_type, length, flat_length);
        let sum_of_squares = coefficients.iter().map(|&w| w * w).sum();

        Self {
            window_type,
            coefficients,
            sum_of_squares,
        }
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Σ w[n]²
    pub fn sum_of_squares(&self) -> f64 {
        self.sum_of_squares
    }

    /// Mean-square value Σ w[n]² / N, the fraction of noise power the taper keeps
    pub fn mean_square(&self) -> f64 {
        if self.coefficients.is_empty() {
            0.0
        } else {
            self.sum_of_squares / self.coefficients.len() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_generation() {
        let length = 161;

        let hann = generate_window(WindowType::Hann, length, 0);
        let hamming = generate_window(WindowType::Hamming, length, 0);
        let blackman = generate_window(WindowType::Blackman, length, 0);

        assert_eq!(hann.len(), length);
        assert_eq!(hamming.len(), length);
        assert_eq!(blackman.len(), length);

        // Symmetric about the centre
        assert!((hann[0] - hann[length - 1]).abs() < 1e-10);
        assert!((hamming[0] - hamming[length - 1]).abs() < 1e-10);
        assert!((blackman[0] - blackman[length - 1]).abs() < 1e-10);

        let center = length / 2;
        assert!((hann[center] - 1.0).abs() < 1e-10);
        assert!((hamming[center] - 1.0).abs() < 1e-10);
        assert!((blackman[center] - 1.0).abs() < 1e-10);

        // Hamming should have non-zero endpoints (0.08)
        assert!(hamming[0] > 0.07 && hamming[0] < 0.09);
    }

    #[test]
    fn test_tukey_flat_region() {
        let window = generate_window(WindowType::Tukey, 64, 32);

        assert_eq!(window.len(), 64);
        assert!(window[16..48].iter().all(|&w| w == 1.0));
        assert!(window[..16].iter().all(|&w| w > 0.0 && w < 1.0));
        assert!(window[48..].iter().all(|&w| w > 0.0 && w < 1.0));

        // Rising edge mirrors the falling edge
        for i in 0..16 {
            assert!((window[i] - window[63 - i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_tukey_full_flat_is_rectangular() {
        let tukey = generate_window(WindowType::Tukey, 32, 32);
        let rect = generate_window(WindowType::Rectangular, 32, 0);
        assert_eq!(tukey, rect);
    }

    #[test]
    fn test_sum_of_squares() {
        let rect = Window::new(WindowType::Rectangular, 100, 0);
        assert!((rect.sum_of_squares() - 100.0).abs() < 1e-12);
        assert!((rect.mean_square() - 1.0).abs() < 1e-12);

        // Hann mean square is 3/8 for long windows
        let hann = Window::new(WindowType::Hann, 4096, 0);
        assert!((hann.mean_square() - 0.375).abs() < 1e-3);

        // Half flat, half raised cosine: 1/2 + 1/2 * 3/8
        let tukey = Window::new(WindowType::Tukey, 1024, 512);
        assert!((tukey.mean_square() - 0.6875).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_lengths() {
        assert!(generate_window(WindowType::Hann, 0, 0).is_empty());
        assert_eq!(generate_window(WindowType::Blackman, 1, 0), vec![1.0]);
    }
}
