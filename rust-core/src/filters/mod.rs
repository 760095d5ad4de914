//! Windows and filters used by the search

pub mod windows;
pub mod highpass;
pub mod channel;

pub use windows::{Window, WindowType, generate_window};
pub use highpass::ButterworthHighpass;
pub use channel::{ChannelFilter, ChannelFilterBank, SpectrumState};
