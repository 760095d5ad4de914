//! Burst event records

/// One tile whose power is inconsistent with stationary Gaussian noise
#[derive(Debug, Clone, PartialEq)]
pub struct BurstEvent {
    /// Name of the analysed channel
    pub channel: String,

    /// Absolute start time (GPS seconds)
    pub start_time: f64,

    /// Duration in seconds
    pub duration: f64,

    /// Central frequency in Hz
    pub central_freq: f64,

    /// Bandwidth in Hz
    pub bandwidth: f64,

    /// Time-frequency volume (bandwidth × duration), the number of complex pixels
    pub tf_volume: f64,

    /// Excess-power SNR (E − P) / √P
    pub snr: f64,

    /// −ln of the probability of the tile's energy under the noise hypothesis
    pub confidence: f64,
}

impl BurstEvent {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    pub fn flow(&self) -> f64 {
        self.central_freq - 0.5 * self.bandwidth
    }

    pub fn fhigh(&self) -> f64 {
        self.central_freq + 0.5 * self.bandwidth
    }

    /// Whether the event intersects [start, end) in time
    pub fn overlaps_time(&self, start: f64, end: f64) -> bool {
        self.start_time < end && start < self.end_time()
    }

    /// Whether the event's band contains `frequency`
    pub fn contains_frequency(&self, frequency: f64) -> bool {
        self.flow() <= frequency && frequency < self.fhigh()
    }
}

/// Events in detection order
pub type EventList = Vec<BurstEvent>;
