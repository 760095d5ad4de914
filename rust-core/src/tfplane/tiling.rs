//! Lazy enumeration of excess-power tiles
//!
//! Shapes run from the narrowest, shortest tile upwards (channel span
//! outer, pixel span inner). For each shape the tile slides over the plane
//! in steps of half its own extent, so neighbouring tiles of one shape
//! overlap by half. The order is fixed, which keeps event lists reproducible.

use std::ops::Range;

use super::plane::TfPlane;

/// Rectangular region of the plane, in whole channels and whole pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub start_channel: usize,
    pub channels: usize,
    pub start_pixel: usize,
    pub pixels: usize,
}

impl Tile {
    /// Number of complex pixels summed by the tile
    pub fn pixel_count(&self) -> usize {
        self.channels * self.pixels
    }

    /// Real degrees of freedom, two per complex pixel
    pub fn dof(&self) -> usize {
        2 * self.pixel_count()
    }

    pub fn bandwidth(&self, plane: &TfPlane) -> f64 {
        self.channels as f64 * plane.channel_bandwidth()
    }

    pub fn duration(&self, plane: &TfPlane) -> f64 {
        self.pixels as f64 * plane.pixel_duration()
    }

    /// Low edge of the tile in Hz
    pub fn flow(&self, plane: &TfPlane) -> f64 {
        plane.flow() + self.start_channel as f64 * plane.channel_bandwidth()
    }

    pub fn central_frequency(&self, plane: &TfPlane) -> f64 {
        self.flow(plane) + 0.5 * self.bandwidth(plane)
    }

    /// Offset of the tile's start from the start of the analysis window in seconds
    pub fn time_offset(&self, plane: &TfPlane) -> f64 {
        self.start_pixel as f64 * plane.pixel_duration()
    }
}

/// Iterator over every admissible tile of a plane
#[derive(Debug, Clone)]
pub struct Tiles {
    total_channels: usize,
    max_channels: usize,
    max_pixels: usize,
    pixels: Range<usize>,

    // Cursor: current shape and position
    shape_channels: usize,
    shape_pixels: usize,
    channel: usize,
    pixel: usize,
}

fn half_step(extent: usize) -> usize {
    (extent / 2).max(1)
}

impl Tiles {
    pub(crate) fn new(
        total_channels: usize,
        max_channels: usize,
        max_pixels: usize,
        pixels: Range<usize>,
    ) -> Self {
        Self {
            total_channels,
            max_channels,
            max_pixels,
            shape_channels: 1,
            shape_pixels: 1,
            channel: 0,
            pixel: pixels.start,
            pixels,
        }
    }

    fn next_shape(&mut self) {
        self.shape_pixels += 1;
        if self.shape_pixels > self.max_pixels {
            self.shape_pixels = 1;
            self.shape_channels += 1;
        }
        self.channel = 0;
        self.pixel = self.pixels.start;
    }
}

impl Iterator for Tiles {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        if self.max_pixels == 0 {
            return None;
        }

        while self.shape_channels <= self.max_channels {
            if self.channel + self.shape_channels > self.total_channels {
                self.next_shape();
                continue;
            }
            if self.pixel + self.shape_pixels > self.pixels.end {
                self.channel += half_step(self.shape_channels);
                self.pixel = self.pixels.start;
                continue;
            }

            let tile = Tile {
                start_channel: self.channel,
                channels: self.shape_channels,
                start_pixel: self.pixel,
                pixels: self.shape_pixels,
            };
            self.pixel += half_step(self.shape_pixels);
            return Some(tile);
        }

        None
    }
}
