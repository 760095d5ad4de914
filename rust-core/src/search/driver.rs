//! Search driver
//!
//! Owns the resources of one search (transform plans, plane, projector),
//! estimates the noise PSD once, then walks the series window by window:
//! extract, transform, whiten, filter, project, score. Events are only
//! handed back when every window succeeded.

use log::{debug, info, warn};

use super::diagnostics::Diagnostics;
use super::event::EventList;
use super::params::SearchParams;
use crate::error::{Result, SearchError};
use crate::filters::channel::{ChannelFilterBank, SpectrumState};
use crate::series::{FrequencySeries, TimeSeries};
use crate::spectrum::{average_spectrum_median, whiten, windowed_forward_fft, FftEngine};
use crate::tfplane::{compute_excess_power, Projector, TfPlane};

/// Per-invocation state of an excess-power search
pub struct SearchDriver {
    confidence_threshold: f64,
    plane: TfPlane,
    engine: FftEngine,
    projector: Projector,
}

impl SearchDriver {
    /// Allocate plans and the plane for data sampled every `delta_t` seconds
    pub fn new(params: &SearchParams, delta_t: f64) -> Result<Self> {
        let plane = TfPlane::new(&params.plane_params(delta_t))?;
        let engine = FftEngine::new(plane.window_length())?;
        let projector = Projector::new(&plane)?;

        info!(
            "excess power plane: {} channels of {} Hz from {} Hz, {} s pixels, tiles up to {} × {}",
            plane.channels(),
            plane.channel_bandwidth(),
            plane.flow(),
            plane.pixel_duration(),
            plane.max_tile_channels(),
            plane.max_tile_pixels()
        );

        Ok(Self {
            confidence_threshold: params.confidence_threshold,
            plane,
            engine,
            projector,
        })
    }

    pub fn plane(&self) -> &TfPlane {
        &self.plane
    }

    /// Search `series` for bursts
    ///
    /// # Arguments
    /// * `series` - Conditioned series, sampled at the interval the driver was built for
    /// * `diagnostics` - Optional sink for the PSD and per-window products
    ///
    /// # Returns
    /// Events in window order; empty if nothing crossed the threshold
    pub fn run(
        &mut self,
        series: &TimeSeries,
        mut diagnostics: Option<&mut dyn Diagnostics>,
    ) -> Result<EventList> {
        let n = self.plane.window_length();
        let shift = self.plane.window_shift();
        if (series.delta_t() - self.plane.delta_t()).abs() > 1e-9 * self.plane.delta_t() {
            return Err(SearchError::Allocation(format!(
                "series sampled every {} s, driver built for {} s",
                series.delta_t(),
                self.plane.delta_t()
            )));
        }

        info!(
            "searching {}: {} samples from epoch {}, windows of {} samples every {}",
            series.name,
            series.len(),
            series.epoch,
            n,
            shift
        );

        let psd = average_spectrum_median(series, n, shift, self.plane.window(), &mut self.engine)?;
        if let Some(sink) = diagnostics.as_mut() {
            if let Err(e) = sink.psd(&psd) {
                warn!("diagnostics sink dropped the PSD: {e}");
            }
        }

        let mut events = EventList::new();
        let mut index = 0;
        let mut start = 0;
        while start + n <= series.len() {
            let found = self.analyze_window(index, series, start, &psd, &mut diagnostics, &mut events)?;
            debug!("window {index} at offset {start}: {found} events");
            index += 1;
            start += shift;
        }

        info!("{} windows analysed, {} events", index, events.len());
        Ok(events)
    }

    fn analyze_window(
        &mut self,
        index: usize,
        series: &TimeSeries,
        start: usize,
        psd: &FrequencySeries<f64>,
        diagnostics: &mut Option<&mut dyn Diagnostics>,
        events: &mut EventList,
    ) -> Result<usize> {
        let segment = series.cut(start, self.plane.window_length())?;
        if let Some(sink) = diagnostics.as_mut() {
            if let Err(e) = sink.segment(index, &segment) {
                warn!("diagnostics sink dropped segment {index}: {e}");
            }
        }

        let mut spectrum = windowed_forward_fft(&segment, self.plane.window(), &mut self.engine)?;
        whiten(&mut spectrum, psd, self.plane.flow(), self.plane.fhigh())?;
        if let Some(sink) = diagnostics.as_mut() {
            if let Err(e) = sink.whitened(index, &spectrum) {
                warn!("diagnostics sink dropped whitened spectrum {index}: {e}");
            }
        }

        // Rebuilt per window
        let bank = ChannelFilterBank::new(&self.plane, psd, SpectrumState::Whitened)?;
        self.projector.project(&mut self.plane, &spectrum, &bank)?;

        compute_excess_power(
            &self.plane,
            segment.epoch,
            self.confidence_threshold,
            &series.name,
            events,
        )
    }
}

/// Run an excess-power search over a conditioned series
///
/// # Arguments
/// * `series` - Conditioned input
/// * `params` - Search configuration
/// * `diagnostics` - Optional sink for intermediate products
pub fn ep_search(
    series: &TimeSeries,
    params: &SearchParams,
    diagnostics: Option<&mut dyn Diagnostics>,
) -> Result<EventList> {
    SearchDriver::new(params, series.delta_t())?.run(series, diagnostics)
}
