//! Spectral estimation and whitening

pub mod fft;
pub mod windowing;
pub mod median;
pub mod whiten;

pub use fft::{ChannelIfft, FftEngine};
pub use windowing::windowed_forward_fft;
pub use median::{average_spectrum_median, median_bias};
pub use whiten::whiten;
