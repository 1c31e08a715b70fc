// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, enhance, and encode a single photo with method
// chaining. Thin façade over the codec adapter and the enhancement module.

use std::path::Path;

use nectacam_core::error::{NectacamError, Result};
use nectacam_core::types::{EnhancementSelection, PixelBuffer};
use tracing::{info, instrument};

use super::codec;
use crate::enhance::{contrast, dispatch, histogram};
use crate::enhance::dispatch::DispatchOutcome;

/// Enhancement pipeline operating on a single in-memory photo.
///
/// All operations are non-destructive: each method consumes `self` and returns a
/// new `ImageProcessor` wrapping the transformed buffer, enabling method chaining.
///
/// ```ignore
/// let jpeg = ImageProcessor::from_bytes(&raw)?
///     .enhance(EnhancementSelection::HistogramEqualization)?
///     .to_jpeg_bytes(100)?;
/// ```
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    /// The current working buffer.
    buffer: PixelBuffer,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load and decode an image file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        let buffer = codec::decode(&data)?;
        info!(width = buffer.width(), height = buffer.height(), "Image loaded");
        Ok(Self { buffer })
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self {
            buffer: codec::decode(data)?,
        })
    }

    /// Wrap an already-decoded buffer.
    pub fn from_buffer(buffer: PixelBuffer) -> Self {
        Self { buffer }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn as_buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Apply the selected enhancement. Flat images under contrast stretching
    /// come back unchanged.
    pub fn enhance(self, selection: EnhancementSelection) -> Result<Self> {
        self.enhance_with_outcome(selection).map(|(processor, _)| processor)
    }

    /// Like [`enhance`](Self::enhance), also reporting which route was taken.
    pub fn enhance_with_outcome(
        self,
        selection: EnhancementSelection,
    ) -> Result<(Self, DispatchOutcome)> {
        let enhancement = dispatch::apply_with_outcome(selection, self.buffer)?;
        Ok((
            Self {
                buffer: enhancement.buffer,
            },
            enhancement.outcome,
        ))
    }

    /// Per-channel histogram equalization.
    pub fn equalize_histogram(self) -> Result<Self> {
        Ok(Self {
            buffer: histogram::equalize(&self.buffer)?,
        })
    }

    /// Luminance-range contrast stretching. Unlike [`enhance`](Self::enhance),
    /// a flat image is reported as `DegenerateRange`.
    pub fn stretch_contrast(self) -> Result<Self> {
        Ok(Self {
            buffer: contrast::stretch(&self.buffer)?,
        })
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current buffer as JPEG bytes with the given quality (0-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        codec::encode(&self.buffer, quality)
    }

    /// Encode the current buffer as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        codec::encode_png(&self.buffer)
    }

    /// Write the image to a file. `.png` is written losslessly; `.jpg` and
    /// `.jpeg` use `quality`.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>, quality: u8) -> Result<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let bytes = match extension.as_deref() {
            Some("png") => self.to_png_bytes()?,
            Some("jpg") | Some("jpeg") => self.to_jpeg_bytes(quality)?,
            other => {
                return Err(NectacamError::EncodeError(format!(
                    "unsupported output extension {:?} for {}",
                    other.unwrap_or(""),
                    path.display()
                )));
            }
        };
        std::fs::write(path, &bytes)?;
        info!(bytes = bytes.len(), "Image saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn low_contrast() -> PixelBuffer {
        PixelBuffer::from_fn(32, 8, |x, _| {
            let v = 100 + (x as u8 % 16);
            [v, v, v]
        })
        .unwrap()
    }

    #[test]
    fn chain_from_png_bytes() {
        let png = ImageProcessor::from_buffer(low_contrast()).to_png_bytes().unwrap();
        let processor = ImageProcessor::from_bytes(&png)
            .unwrap()
            .enhance(EnhancementSelection::ContrastStretching)
            .unwrap();

        assert_eq!((processor.width(), processor.height()), (32, 8));
        // 100..=115 stretched onto the full range.
        let samples = processor.as_buffer().samples();
        assert_eq!(samples.iter().min(), Some(&0));
        assert_eq!(samples.iter().max(), Some(&255));
    }

    #[test]
    fn enhance_reports_fallback_for_flat_image() {
        let flat = PixelBuffer::filled(5, 5, [9, 9, 9]).unwrap();
        let (processor, outcome) = ImageProcessor::from_buffer(flat.clone())
            .enhance_with_outcome(EnhancementSelection::ContrastStretching)
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::DegenerateFallback);
        assert_eq!(processor.into_buffer(), flat);
    }

    #[test]
    fn direct_stretch_reports_degenerate_range() {
        let flat = PixelBuffer::filled(5, 5, [9, 9, 9]).unwrap();
        let result = ImageProcessor::from_buffer(flat).stretch_contrast();
        assert!(matches!(result, Err(NectacamError::DegenerateRange { luminance: 9 })));
    }

    #[test]
    fn save_rejects_unknown_extension() {
        let processor = ImageProcessor::from_buffer(low_contrast());
        let path = std::env::temp_dir().join("nectacam-processor-test.bmp");
        assert!(matches!(
            processor.save(&path, 100),
            Err(NectacamError::EncodeError(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let result = ImageProcessor::open("/nonexistent/nectacam/photo.jpg");
        assert!(matches!(result, Err(NectacamError::Io(_))));
    }
}
