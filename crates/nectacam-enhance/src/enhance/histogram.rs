// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Histogram equalization — per-channel cumulative histograms remap every
// intensity so that each channel's cumulative distribution approaches a
// linear ramp.

use nectacam_core::error::{NectacamError, Result};
use nectacam_core::types::{CHANNELS, ChannelLut, LEVELS, PixelBuffer};
use tracing::{debug, instrument};

/// Occurrence count of each intensity (0..=255) within one colour channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHistogram {
    counts: [u32; LEVELS],
}

impl Default for ChannelHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelHistogram {
    pub fn new() -> Self {
        Self {
            counts: [0; LEVELS],
        }
    }

    /// Count one more occurrence of `value`.
    pub fn record(&mut self, value: u8) {
        self.counts[value as usize] += 1;
    }

    pub fn count(&self, value: u8) -> u32 {
        self.counts[value as usize]
    }

    pub fn counts(&self) -> &[u32; LEVELS] {
        &self.counts
    }

    /// Prefix-sum the counts: `cum[0] = hist[0]`, `cum[i] = cum[i-1] + hist[i]`.
    pub fn cumulative(&self) -> CumulativeHistogram {
        let mut totals = [0u32; LEVELS];
        let mut running = 0u32;
        for (total, &count) in totals.iter_mut().zip(self.counts.iter()) {
            running += count;
            *total = running;
        }
        CumulativeHistogram { totals }
    }
}

/// Number of samples at or below each intensity. Read-only lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeHistogram {
    totals: [u32; LEVELS],
}

impl CumulativeHistogram {
    /// Samples with intensity `<= value`.
    pub fn at(&self, value: u8) -> u32 {
        self.totals[value as usize]
    }

    /// Total number of samples (the last bucket).
    pub fn total(&self) -> u32 {
        self.totals[LEVELS - 1]
    }

    pub fn totals(&self) -> &[u32; LEVELS] {
        &self.totals
    }

    /// Lookup table mapping `v` to `floor(cum[v] * 255 / pixel_count)`.
    ///
    /// `cum[255] == pixel_count` bounds every entry to 255 already; the clamp
    /// only guards against floating-point overshoot.
    fn equalization_lut(&self, pixel_count: u32) -> ChannelLut {
        let scale = 255.0 / f64::from(pixel_count);
        let mut lut = [0u8; LEVELS];
        for (out, &cumulative) in lut.iter_mut().zip(self.totals.iter()) {
            *out = (f64::from(cumulative) * scale).clamp(0.0, 255.0) as u8;
        }
        lut
    }
}

/// Build one histogram per colour channel (red, green, blue).
pub fn channel_histograms(buffer: &PixelBuffer) -> [ChannelHistogram; CHANNELS] {
    let mut histograms: [ChannelHistogram; CHANNELS] = Default::default();
    for px in buffer.pixels() {
        for (histogram, value) in histograms.iter_mut().zip(px) {
            histogram.record(value);
        }
    }
    histograms
}

/// Equalize each colour channel independently.
///
/// Returns a new buffer of identical dimensions. `PixelBuffer::new` rejects
/// zero dimensions, so `pixel_count` is never zero here. Fails with
/// `InvalidBuffer` only when the pixel count cannot be represented by the
/// 32-bit histogram counters.
#[instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn equalize(buffer: &PixelBuffer) -> Result<PixelBuffer> {
    let pixel_count = u32::try_from(buffer.pixel_count()).map_err(|_| {
        NectacamError::InvalidBuffer(format!(
            "{} pixels exceed the histogram counter range",
            buffer.pixel_count()
        ))
    })?;
    let luts = channel_histograms(buffer).map(|h| h.cumulative().equalization_lut(pixel_count));
    debug!(pixel_count, "Channel lookup tables built");

    Ok(buffer.map_channels(&luts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, RgbImage};

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| {
            [
                (x * 7 % 256) as u8,
                (y * 13 % 256) as u8,
                ((x + y) * 3 % 97) as u8,
            ]
        })
        .unwrap()
    }

    #[test]
    fn cumulative_is_prefix_sum() {
        let mut hist = ChannelHistogram::new();
        for v in [0u8, 0, 3, 255] {
            hist.record(v);
        }
        let cum = hist.cumulative();
        assert_eq!(cum.at(0), 2);
        assert_eq!(cum.at(2), 2);
        assert_eq!(cum.at(3), 3);
        assert_eq!(cum.at(254), 3);
        assert_eq!(cum.total(), 4);
    }

    /// 2x2 mid-gray: every channel spikes at 128 with count 4, so
    /// cum[128] * 255/4 == 255 and every sample becomes white.
    #[test]
    fn flat_gray_becomes_white() {
        let buf = PixelBuffer::filled(2, 2, [128, 128, 128]).unwrap();

        let histograms = channel_histograms(&buf);
        for hist in &histograms {
            assert_eq!(hist.count(128), 4);
            assert_eq!(hist.cumulative().at(128), 4);
            assert_eq!(hist.cumulative().at(127), 0);
        }

        let out = equalize(&buf).unwrap();
        assert!(out.pixels().all(|px| px == [255, 255, 255]));
    }

    #[test]
    fn preserves_dimensions() {
        let buf = gradient(37, 11);
        let out = equalize(&buf).unwrap();
        assert_eq!(out.dimensions(), (37, 11));
        assert_eq!(out.samples().len(), buf.samples().len());
    }

    /// Every intensity appearing equally often is already a linear ramp, so
    /// equalization leaves it (within rounding) unchanged.
    #[test]
    fn uniform_distribution_is_near_identity() {
        let buf = PixelBuffer::from_fn(256, 4, |x, y| {
            let v = x as u8;
            [v, v.wrapping_add(y as u8 * 64), 255 - v]
        })
        .unwrap();

        let out = equalize(&buf).unwrap();
        for (before, after) in buf.samples().iter().zip(out.samples()) {
            assert!(
                before.abs_diff(*after) <= 1,
                "expected near-identity, {before} became {after}"
            );
        }
    }

    #[test]
    fn channels_are_remapped_independently() {
        // Red ramps, green is constant, blue has two levels.
        let buf = PixelBuffer::from_fn(4, 1, |x, _| [x as u8 * 10, 50, if x < 2 { 0 } else { 200 }])
            .unwrap();
        let out = equalize(&buf).unwrap();
        let pixels: Vec<_> = out.pixels().collect();

        // red: cum = 1,2,3,4 over 4 pixels -> 63, 127, 191, 255
        assert_eq!(
            pixels.iter().map(|px| px[0]).collect::<Vec<_>>(),
            vec![63, 127, 191, 255]
        );
        // green: single spike
        assert!(pixels.iter().all(|px| px[1] == 255));
        // blue: cum[0] = 2 -> 127, cum[200] = 4 -> 255
        assert_eq!(
            pixels.iter().map(|px| px[2]).collect::<Vec<_>>(),
            vec![127, 127, 255, 255]
        );
    }

    /// Every output level keeps the cumulative count of the level it came
    /// from, so a second pass reproduces the first.
    #[test]
    fn equalizing_twice_matches_once() {
        let buf = gradient(64, 48);
        let once = equalize(&buf).unwrap();
        let twice = equalize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn histograms_match_imageproc() {
        let buf = gradient(50, 30);
        let rgb = RgbImage::from_raw(50, 30, buf.samples().to_vec()).unwrap();
        let reference = imageproc::stats::histogram(&rgb);
        let cumulative = imageproc::stats::cumulative_histogram(&rgb);

        let ours = channel_histograms(&buf);
        for channel in 0..CHANNELS {
            assert_eq!(ours[channel].counts(), &reference.channels[channel]);
            assert_eq!(ours[channel].cumulative().totals(), &cumulative.channels[channel]);
        }
    }

    /// On gray input all three channels match imageproc's grayscale
    /// equalization, allowing one level for its single-precision arithmetic.
    #[test]
    fn gray_input_agrees_with_imageproc() {
        let gray = GrayImage::from_fn(40, 25, |x, y| image::Luma([((x * y) % 180 + 20) as u8]));
        let buf = PixelBuffer::from_fn(40, 25, |x, y| {
            let v = gray.get_pixel(x, y).0[0];
            [v, v, v]
        })
        .unwrap();

        let expected = imageproc::contrast::equalize_histogram(&gray);
        let out = equalize(&buf).unwrap();
        for (px, reference) in out.pixels().zip(expected.pixels()) {
            for value in px {
                assert!(value.abs_diff(reference.0[0]) <= 1);
            }
        }
    }
}
