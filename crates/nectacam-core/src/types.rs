// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the NectaCam capture pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{NectacamError, Result};

/// Number of interleaved samples per pixel (red, green, blue).
pub const CHANNELS: usize = 3;

/// Number of distinct 8-bit intensity levels.
pub const LEVELS: usize = 256;

/// Per-channel lookup table mapping an input intensity to an output intensity.
pub type ChannelLut = [u8; LEVELS];

// ---------------------------------------------------------------------------
// PixelBuffer
// ---------------------------------------------------------------------------

/// A decoded 8-bit RGB raster.
///
/// Samples are interleaved `r, g, b` per pixel, row-major, with no row
/// padding. The constructor enforces `samples.len() == width * height * 3`
/// and non-zero dimensions, so every value of this type is well-formed.
///
/// Buffers are never mutated after construction: transforms build a new
/// buffer and leave their input untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap an interleaved RGB sample vector.
    ///
    /// Fails with `InvalidBuffer` when either dimension is zero or the sample
    /// count does not match the dimensions.
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        let expected = expected_len(width, height)?;
        if samples.len() != expected {
            return Err(NectacamError::InvalidBuffer(format!(
                "expected {expected} samples for {width}x{height}, got {}",
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel in row-major order.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> [u8; CHANNELS],
    ) -> Result<Self> {
        let mut samples = Vec::with_capacity(expected_len(width, height)?);
        for y in 0..height {
            for x in 0..width {
                samples.extend_from_slice(&f(x, y));
            }
        }
        Self::new(width, height, samples)
    }

    /// A buffer where every pixel has the same colour.
    pub fn filled(width: u32, height: u32, rgb: [u8; CHANNELS]) -> Result<Self> {
        Self::from_fn(width, height, |_, _| rgb)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels (`width * height`).
    pub fn pixel_count(&self) -> usize {
        self.samples.len() / CHANNELS
    }

    /// Borrow the raw interleaved samples.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Consume the buffer and return the raw interleaved samples.
    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// The `[r, g, b]` triple at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; CHANNELS]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = &self.samples[offset..offset + CHANNELS];
        Some([px[0], px[1], px[2]])
    }

    /// Iterate over pixels as `[r, g, b]` triples in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; CHANNELS]> + '_ {
        self.samples
            .chunks_exact(CHANNELS)
            .map(|px| [px[0], px[1], px[2]])
    }

    /// Build a new buffer of identical dimensions by passing every sample of
    /// channel `c` through `luts[c]`.
    pub fn map_channels(&self, luts: &[ChannelLut; CHANNELS]) -> Self {
        let mut samples = Vec::with_capacity(self.samples.len());
        for px in self.samples.chunks_exact(CHANNELS) {
            for (channel, &value) in px.iter().enumerate() {
                samples.push(luts[channel][value as usize]);
            }
        }
        Self {
            width: self.width,
            height: self.height,
            samples,
        }
    }
}

/// Sample count for a `width` x `height` RGB raster, validating the dimensions.
fn expected_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(NectacamError::InvalidBuffer(format!(
            "dimensions must be non-zero, got {width}x{height}"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(CHANNELS))
        .ok_or_else(|| {
            NectacamError::InvalidBuffer(format!("{width}x{height} overflows the address space"))
        })
}

// ---------------------------------------------------------------------------
// Enhancement selection
// ---------------------------------------------------------------------------

/// Which enhancement to apply to a captured frame.
///
/// Resolved once, at the moment the shutter fires, and carried alongside the
/// captured bytes from then on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnhancementSelection {
    /// Per-channel histogram equalization.
    HistogramEqualization,
    /// Linear stretch of the luminance range onto [0, 255].
    ContrastStretching,
    /// Leave the frame unchanged.
    #[default]
    None,
}

impl EnhancementSelection {
    /// Every selection in the order the picker lists them.
    pub const ALL: [Self; 3] = [
        Self::None,
        Self::HistogramEqualization,
        Self::ContrastStretching,
    ];

    /// Label shown in the enhancement picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::HistogramEqualization => "Histogram Equalization",
            Self::ContrastStretching => "Contrast Stretching",
            Self::None => "None",
        }
    }

    /// Resolve a picker label. Anything unrecognised, including no label at
    /// all, falls through to `None`.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("Histogram Equalization") => Self::HistogramEqualization,
            Some("Contrast Stretching") => Self::ContrastStretching,
            _ => Self::None,
        }
    }
}

impl std::fmt::Display for EnhancementSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Capture identity and orientation
// ---------------------------------------------------------------------------

/// Unique identifier for a single shutter press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureId(pub Uuid);

impl CaptureId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CaptureId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CaptureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rotation of the display surface relative to its natural orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceRotation {
    #[default]
    Rotation0,
    Rotation90,
    Rotation180,
    Rotation270,
}

impl SurfaceRotation {
    /// Rotation of the surface in degrees.
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Rotation0 => 0,
            Self::Rotation90 => 90,
            Self::Rotation180 => 180,
            Self::Rotation270 => 270,
        }
    }

    /// JPEG orientation (degrees) to request for a still capture taken while
    /// the display is in this rotation, for a sensor mounted at 90 degrees.
    pub const fn default_jpeg_orientation(self) -> u16 {
        match self {
            Self::Rotation0 => 90,
            Self::Rotation90 => 0,
            Self::Rotation180 => 270,
            Self::Rotation270 => 180,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_matching_length() {
        let buf = PixelBuffer::new(2, 1, vec![0, 0, 0, 255, 255, 255]).unwrap();
        assert_eq!(buf.dimensions(), (2, 1));
        assert_eq!(buf.pixel_count(), 2);
        assert_eq!(buf.pixel(1, 0), Some([255, 255, 255]));
        assert_eq!(buf.pixel(2, 0), None);
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        for (w, h) in [(0, 4), (4, 0), (0, 0)] {
            let err = PixelBuffer::new(w, h, Vec::new()).unwrap_err();
            assert!(matches!(err, NectacamError::InvalidBuffer(_)), "{w}x{h}: {err}");
        }
    }

    #[test]
    fn new_rejects_length_mismatch() {
        let err = PixelBuffer::new(2, 2, vec![0; 11]).unwrap_err();
        match err {
            NectacamError::InvalidBuffer(msg) => assert!(msg.contains("expected 12")),
            other => panic!("unexpected error variant: {other}"),
        }
    }

    #[test]
    fn from_fn_is_row_major() {
        let buf = PixelBuffer::from_fn(3, 2, |x, y| [x as u8, y as u8, 7]).unwrap();
        let pixels: Vec<_> = buf.pixels().collect();
        assert_eq!(pixels[0], [0, 0, 7]);
        assert_eq!(pixels[2], [2, 0, 7]);
        assert_eq!(pixels[3], [0, 1, 7]);
        assert_eq!(buf.pixel(2, 1), Some([2, 1, 7]));
    }

    #[test]
    fn map_channels_uses_one_table_per_channel() {
        let buf = PixelBuffer::filled(2, 2, [10, 20, 30]).unwrap();
        let mut luts = [[0u8; LEVELS]; CHANNELS];
        luts[0][10] = 1;
        luts[1][20] = 2;
        luts[2][30] = 3;

        let mapped = buf.map_channels(&luts);
        assert_eq!(mapped.dimensions(), (2, 2));
        assert!(mapped.pixels().all(|px| px == [1, 2, 3]));
        // Input untouched.
        assert!(buf.pixels().all(|px| px == [10, 20, 30]));
    }

    #[test]
    fn selection_labels_round_trip() {
        for selection in EnhancementSelection::ALL {
            assert_eq!(
                EnhancementSelection::from_label(Some(selection.label())),
                selection
            );
        }
    }

    #[test]
    fn unknown_or_missing_label_is_none() {
        assert_eq!(EnhancementSelection::from_label(None), EnhancementSelection::None);
        assert_eq!(
            EnhancementSelection::from_label(Some("histogram equalization")),
            EnhancementSelection::None
        );
        assert_eq!(EnhancementSelection::from_label(Some("Sepia")), EnhancementSelection::None);
    }

    #[test]
    fn orientation_table() {
        assert_eq!(SurfaceRotation::Rotation0.default_jpeg_orientation(), 90);
        assert_eq!(SurfaceRotation::Rotation90.default_jpeg_orientation(), 0);
        assert_eq!(SurfaceRotation::Rotation180.default_jpeg_orientation(), 270);
        assert_eq!(SurfaceRotation::Rotation270.default_jpeg_orientation(), 180);
    }
}
