// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contrast stretching — rescales every channel so that the observed
// luminance range maps onto [0, 255].
//
// The range comes from per-pixel average luminance, not from each channel, and
// the same min/max is applied to all three channels. Individual channels can
// therefore be under- or over-stretched; that asymmetry is part of the
// algorithm's output.

use nectacam_core::error::{NectacamError, Result};
use nectacam_core::types::{CHANNELS, ChannelLut, LEVELS, PixelBuffer};
use tracing::{debug, instrument};

/// Integer luminance of a pixel: `(r + g + b) / 3`, truncating.
pub fn luminance(px: [u8; CHANNELS]) -> u8 {
    ((u16::from(px[0]) + u16::from(px[1]) + u16::from(px[2])) / 3) as u8
}

/// Darkest and brightest per-pixel luminance in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LuminanceRange {
    pub min: u8,
    pub max: u8,
}

impl LuminanceRange {
    /// Scan every pixel, tracking the running min (from 255) and max (from 0).
    pub fn of(buffer: &PixelBuffer) -> Self {
        buffer.pixels().map(luminance).fold(
            Self { min: 255, max: 0 },
            |range, lum| Self {
                min: range.min.min(lum),
                max: range.max.max(lum),
            },
        )
    }

    /// A flat image: every pixel has the same luminance.
    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }

    /// `255 / (max - min)`, or `DegenerateRange` when the range is empty.
    pub fn scale(&self) -> Result<f64> {
        if self.is_degenerate() {
            return Err(NectacamError::DegenerateRange {
                luminance: self.min,
            });
        }
        Ok(255.0 / f64::from(self.max - self.min))
    }

    /// Lookup table mapping `v` to `clamp(trunc((v - min) * scale), 0, 255)`,
    /// shared by all three channels.
    pub fn stretch_lut(&self) -> Result<ChannelLut> {
        let scale = self.scale()?;
        let min = i32::from(self.min);
        let mut lut = [0u8; LEVELS];
        for (value, out) in lut.iter_mut().enumerate() {
            // `as` truncates toward zero, so slightly negative products land on 0.
            let stretched = (f64::from(value as i32 - min) * scale) as i64;
            *out = stretched.clamp(0, 255) as u8;
        }
        Ok(lut)
    }
}

/// Stretch contrast using the buffer's luminance range.
///
/// Fails with `DegenerateRange` on a flat image, where the scale would divide
/// by zero. No partial output is produced.
#[instrument(skip(buffer), fields(width = buffer.width(), height = buffer.height()))]
pub fn stretch(buffer: &PixelBuffer) -> Result<PixelBuffer> {
    let range = LuminanceRange::of(buffer);
    let lut = range.stretch_lut()?;
    debug!(min = range.min, max = range.max, "Luminance range computed");

    Ok(buffer.map_channels(&[lut; CHANNELS]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luminance_truncates() {
        assert_eq!(luminance([0, 0, 2]), 0);
        assert_eq!(luminance([1, 1, 2]), 1);
        assert_eq!(luminance([255, 255, 255]), 255);
        assert_eq!(luminance([255, 0, 0]), 85);
    }

    /// Black and white already span the full range: scale 1.0, output unchanged.
    #[test]
    fn black_and_white_unchanged() {
        let buf = PixelBuffer::new(2, 1, vec![0, 0, 0, 255, 255, 255]).unwrap();

        let range = LuminanceRange::of(&buf);
        assert_eq!(range, LuminanceRange { min: 0, max: 255 });
        assert_eq!(range.scale().unwrap(), 1.0);

        let out = stretch(&buf).unwrap();
        assert_eq!(out, buf);
    }

    #[test]
    fn flat_image_is_degenerate() {
        let buf = PixelBuffer::filled(3, 3, [128, 128, 128]).unwrap();
        let err = stretch(&buf).unwrap_err();
        assert!(matches!(err, NectacamError::DegenerateRange { luminance: 128 }));
    }

    #[test]
    fn single_pixel_is_degenerate() {
        let buf = PixelBuffer::filled(1, 1, [10, 200, 30]).unwrap();
        assert!(LuminanceRange::of(&buf).is_degenerate());
        assert!(stretch(&buf).is_err());
    }

    /// Differently coloured pixels with equal luminance still count as flat.
    #[test]
    fn equal_luminance_different_colours_is_degenerate() {
        let buf = PixelBuffer::new(2, 1, vec![90, 0, 0, 0, 0, 90]).unwrap();
        assert_eq!(LuminanceRange::of(&buf), LuminanceRange { min: 30, max: 30 });
        assert!(stretch(&buf).is_err());
    }

    #[test]
    fn products_truncate_instead_of_rounding() {
        // Range 0..7, scale 255/7: 6 * 36.43 = 218.57 -> 218.
        let buf = PixelBuffer::new(3, 1, vec![0, 0, 0, 6, 6, 6, 7, 7, 7]).unwrap();
        let out = stretch(&buf).unwrap();
        assert_eq!(out.pixel(0, 0), Some([0, 0, 0]));
        assert_eq!(out.pixel(1, 0), Some([218, 218, 218]));
    }

    /// The shared luminance range clamps a channel that sits below the
    /// darkest luminance to 0 and one above the brightest to 255.
    #[test]
    fn shared_range_clamps_individual_channels() {
        // Luminances: (0,0,90) -> 30, (200,200,200) -> 200. Scale 255/170 = 1.5.
        let buf = PixelBuffer::new(2, 1, vec![0, 0, 90, 200, 200, 200]).unwrap();
        let out = stretch(&buf).unwrap();
        assert_eq!(out.pixel(0, 0), Some([0, 0, 90]));
        assert_eq!(out.pixel(1, 0), Some([255, 255, 255]));

        // Red at 255 with luminance 85 overshoots the brightest luminance.
        let buf = PixelBuffer::new(3, 1, vec![0, 0, 0, 255, 0, 0, 60, 60, 60]).unwrap();
        let out = stretch(&buf).unwrap();
        assert_eq!(out.pixel(1, 0), Some([255, 0, 0]));
    }

    #[test]
    fn preserves_dimensions() {
        let buf = PixelBuffer::from_fn(19, 7, |x, y| [(x * 9) as u8, (y * 20) as u8, 100]).unwrap();
        let out = stretch(&buf).unwrap();
        assert_eq!(out.dimensions(), buf.dimensions());
    }
}
