//! Excess-power scoring of tiles
//!
//! Pixel energies are reduced to per-channel prefix sums once per window,
//! after which a tile's energy costs one subtraction per channel it spans.

use log::debug;
use ndarray::Array2;

use super::plane::TfPlane;
use crate::error::{Result, SearchError};
use crate::search::event::{BurstEvent, EventList};
use crate::stats::excess_power_confidence;

/// Score every tile of `plane` and append those above `threshold`
///
/// # Arguments
/// * `plane` - Plane holding the current window's pixels
/// * `window_epoch` - Absolute time of the window's first sample
/// * `threshold` - Minimum confidence (−ln Q) for a tile to be reported
/// * `channel` - Name recorded on each event
/// * `events` - List the events are appended to
///
/// # Returns
/// Number of events appended
pub fn compute_excess_power(
    plane: &TfPlane,
    window_epoch: f64,
    threshold: f64,
    channel: &str,
    events: &mut EventList,
) -> Result<usize> {
    let pixels = plane.pixels();
    let (channels, width) = pixels.dim();

    // cumulative[[c, m]] = energy of pixels 0..m in channel c
    let mut cumulative = Array2::<f64>::zeros((channels, width + 1));
    for ((c, m), pixel) in pixels.indexed_iter() {
        let energy = pixel.norm_sqr();
        if !energy.is_finite() {
            return Err(SearchError::Scoring(format!(
                "non-finite energy in channel {c}, pixel {m}"
            )));
        }
        cumulative[[c, m + 1]] = cumulative[[c, m]] + energy;
    }

    let before = events.len();
    let mut considered = 0usize;
    for tile in plane.tiles() {
        considered += 1;
        let end = tile.start_pixel + tile.pixels;
        let energy: f64 = (tile.start_channel..tile.start_channel + tile.channels)
            .map(|c| cumulative[[c, end]] - cumulative[[c, tile.start_pixel]])
            .sum::<f64>()
            .max(0.0);

        let count = tile.pixel_count();
        let confidence = excess_power_confidence(count, energy).ok_or_else(|| {
            SearchError::Scoring(format!(
                "tail probability undefined for {count} pixels with energy {energy}"
            ))
        })?;

        if confidence > threshold {
            let p = count as f64;
            events.push(BurstEvent {
                channel: channel.to_string(),
                start_time: window_epoch + tile.time_offset(plane),
                duration: tile.duration(plane),
                central_freq: tile.central_frequency(plane),
                bandwidth: tile.bandwidth(plane),
                tf_volume: tile.bandwidth(plane) * tile.duration(plane),
                snr: (energy - p) / p.sqrt(),
                confidence,
            });
        }
    }

    let appended = events.len() - before;
    debug!("scored {considered} tiles, {appended} above threshold {threshold}");

    Ok(appended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::windows::WindowType;
    use crate::tfplane::PlaneParams;
    use num_complex::Complex64;

    fn plane() -> TfPlane {
        TfPlane::new(&PlaneParams {
            window_length: 256,
            delta_t: 1.0 / 256.0,
            flow: 16.0,
            bandwidth: 64.0,
            fractional_stride: 0.5,
            max_tile_bandwidth: 32.0,
            max_tile_duration: 0.125,
            window_type: WindowType::Tukey,
        })
        .unwrap()
    }

    fn fill(plane: &mut TfPlane, value: f64) {
        plane.pixels_mut().fill(Complex64::new(value, 0.0));
    }

    #[test]
    fn test_quiet_plane_has_no_events() {
        let mut plane = plane();
        fill(&mut plane, 1.0);
        let mut events = EventList::new();

        let appended = compute_excess_power(&plane, 0.0, 10.0, "H1:TEST", &mut events).unwrap();
        assert_eq!(appended, 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_loud_pixel_located() {
        let mut plane = plane();
        fill(&mut plane, 0.0);
        // Channel 2 spans [48, 64) Hz, pixel 6 spans [0.375, 0.4375) s
        plane.pixels_mut()[[2, 6]] = Complex64::new(0.0, 10.0);

        let mut events = EventList::new();
        compute_excess_power(&plane, 1000.0, 20.0, "H1:TEST", &mut events).unwrap();
        assert!(!events.is_empty());

        let single = events
            .iter()
            .find(|e| (e.bandwidth - 16.0).abs() < 1e-9 && (e.duration - 0.0625).abs() < 1e-12)
            .unwrap();
        assert!((single.start_time - 1000.375).abs() < 1e-9);
        assert!((single.central_freq - 56.0).abs() < 1e-9);
        assert!((single.confidence - 100.0).abs() < 1e-6);
        assert!((single.snr - 99.0).abs() < 1e-9);
        assert!((single.tf_volume - 1.0).abs() < 1e-9);
        assert_eq!(single.channel, "H1:TEST");

        for e in &events {
            assert!(e.overlaps_time(1000.375, 1000.4375));
            assert!(e.contains_frequency(56.0));
        }
    }

    #[test]
    fn test_threshold_monotonic() {
        let mut plane = plane();
        fill(&mut plane, 1.0);
        plane.pixels_mut()[[1, 5]] = Complex64::new(6.0, 0.0);
        plane.pixels_mut()[[2, 7]] = Complex64::new(4.0, 3.0);
        plane.pixels_mut()[[0, 9]] = Complex64::new(3.0, 0.0);

        let mut low = EventList::new();
        let mut high = EventList::new();
        compute_excess_power(&plane, 0.0, 5.0, "X", &mut low).unwrap();
        compute_excess_power(&plane, 0.0, 15.0, "X", &mut high).unwrap();

        assert!(high.len() < low.len());
        for e in &high {
            assert!(low.contains(e));
        }
    }

    #[test]
    fn test_events_appended_after_existing() {
        let mut plane = plane();
        fill(&mut plane, 3.0);
        let mut events = EventList::new();

        let first = compute_excess_power(&plane, 0.0, 1.0, "X", &mut events).unwrap();
        let second = compute_excess_power(&plane, 0.5, 1.0, "X", &mut events).unwrap();
        assert_eq!(first, second);
        assert_eq!(events.len(), first + second);
        assert!(events[first].start_time > events[0].start_time);
    }

    #[test]
    fn test_non_finite_pixel_fails() {
        let mut plane = plane();
        fill(&mut plane, 1.0);
        plane.pixels_mut()[[0, 0]] = Complex64::new(f64::NAN, 0.0);

        let mut events = EventList::new();
        let result = compute_excess_power(&plane, 0.0, 10.0, "X", &mut events);
        assert!(matches!(result, Err(SearchError::Scoring(_))));
        assert!(events.is_empty());
    }
}
