// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture pipeline — decode, enhance, re-encode, and save each captured JPEG.
//
// Pixel work runs on tokio's blocking pool so the session driver keeps
// servicing device events while a frame is being processed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use nectacam_bridge::NativeGallery;
use nectacam_core::error::{NectacamError, Result};
use nectacam_core::types::{CaptureId, EnhancementSelection};
use nectacam_enhance::{DispatchOutcome, apply_with_outcome, decode, encode};
use tokio::sync::mpsc;
use tracing::{error, info, instrument};

use crate::stats::{CaptureStats, StatsSnapshot};

/// MIME type of every image the pipeline writes.
pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// Raw device output together with the enhancement chosen when the shutter
/// fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub id: CaptureId,
    pub selection: EnhancementSelection,
    pub jpeg: Vec<u8>,
    pub captured_at: DateTime<Utc>,
}

impl CapturedImage {
    /// Wrap bytes captured just now.
    pub fn new(selection: EnhancementSelection, jpeg: Vec<u8>) -> Self {
        Self {
            id: CaptureId::new(),
            selection,
            jpeg,
            captured_at: Utc::now(),
        }
    }

    /// Gallery file name: `<prefix><unix-millis>.jpg`.
    pub fn display_name(&self, prefix: &str) -> String {
        format!("{}{}.jpg", prefix, self.captured_at.timestamp_millis())
    }
}

/// Re-encoded JPEG ready for the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedCapture {
    pub id: CaptureId,
    pub outcome: DispatchOutcome,
    pub jpeg: Vec<u8>,
}

/// Where a processed capture ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCapture {
    pub id: CaptureId,
    pub location: String,
    pub outcome: DispatchOutcome,
    pub bytes: usize,
}

/// Decode, enhance with the capture's own selection, and re-encode.
#[instrument(skip_all, fields(id = %image.id, selection = %image.selection))]
pub fn enhance_capture(image: &CapturedImage, quality: u8) -> Result<EnhancedCapture> {
    let buffer = decode(&image.jpeg)?;
    let enhancement = apply_with_outcome(image.selection, buffer)?;
    let jpeg = encode(&enhancement.buffer, quality)?;
    Ok(EnhancedCapture {
        id: image.id,
        outcome: enhancement.outcome,
        jpeg,
    })
}

/// Enhances captures and saves them to a gallery, counting outcomes.
#[derive(Clone)]
pub struct CapturePipeline {
    gallery: Arc<dyn NativeGallery + Send + Sync>,
    quality: u8,
    file_name_prefix: String,
    stats: Arc<CaptureStats>,
}

impl CapturePipeline {
    pub fn new(
        gallery: Arc<dyn NativeGallery + Send + Sync>,
        quality: u8,
        file_name_prefix: impl Into<String>,
    ) -> Self {
        Self {
            gallery,
            quality,
            file_name_prefix: file_name_prefix.into(),
            stats: Arc::new(CaptureStats::new()),
        }
    }

    /// Count into `stats` instead of a private set of counters.
    pub fn with_stats(mut self, stats: Arc<CaptureStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn stats(&self) -> Arc<CaptureStats> {
        Arc::clone(&self.stats)
    }

    /// Process one capture. A failure is counted and returned; nothing is
    /// written to the gallery in that case.
    pub async fn process(&self, image: CapturedImage) -> Result<SavedCapture> {
        match self.process_inner(image).await {
            Ok(saved) => {
                self.stats.record(saved.outcome);
                Ok(saved)
            }
            Err(err) => {
                self.stats.record_failure();
                Err(err)
            }
        }
    }

    async fn process_inner(&self, image: CapturedImage) -> Result<SavedCapture> {
        let id = image.id;
        let display_name = image.display_name(&self.file_name_prefix);
        let quality = self.quality;
        let gallery = Arc::clone(&self.gallery);

        let saved = tokio::task::spawn_blocking(move || -> Result<SavedCapture> {
            let enhanced = enhance_capture(&image, quality)?;
            let location = gallery.save_image(&display_name, JPEG_MIME_TYPE, &enhanced.jpeg)?;
            Ok(SavedCapture {
                id: enhanced.id,
                location,
                outcome: enhanced.outcome,
                bytes: enhanced.jpeg.len(),
            })
        })
        .await
        .map_err(|err| NectacamError::CaptureFailed(format!("enhancement task failed: {}", err)))??;

        info!(
            id = %id,
            location = %saved.location,
            outcome = ?saved.outcome,
            bytes = saved.bytes,
            "Capture saved"
        );
        Ok(saved)
    }

    /// Process captures until the sender side closes, then report totals.
    pub async fn run(&self, mut captures: mpsc::Receiver<CapturedImage>) -> StatsSnapshot {
        while let Some(image) = captures.recv().await {
            let id = image.id;
            if let Err(err) = self.process(image).await {
                error!(id = %id, error = %err, "Capture processing failed");
            }
        }
        let totals = self.stats.snapshot();
        info!(%totals, "Capture pipeline stopped");
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::DirectoryGallery;
    use nectacam_core::types::PixelBuffer;

    fn jpeg_of(buffer: &PixelBuffer) -> Vec<u8> {
        encode(buffer, 100).unwrap()
    }

    fn textured() -> Vec<u8> {
        jpeg_of(
            &PixelBuffer::from_fn(32, 24, |x, y| [(60 + x * 3) as u8, (80 + y * 2) as u8, 100])
                .unwrap(),
        )
    }

    fn pipeline_in(dir: &std::path::Path) -> CapturePipeline {
        let gallery = DirectoryGallery::new(dir).unwrap();
        CapturePipeline::new(Arc::new(gallery), 90, "IMG_")
    }

    #[test]
    fn display_name_uses_prefix_and_millis() {
        let mut image = CapturedImage::new(EnhancementSelection::None, Vec::new());
        image.captured_at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(image.display_name("IMG_"), "IMG_1700000000123.jpg");
    }

    #[test]
    fn enhance_capture_keeps_dimensions() {
        let image = CapturedImage::new(EnhancementSelection::HistogramEqualization, textured());
        let enhanced = enhance_capture(&image, 80).unwrap();
        assert_eq!(enhanced.id, image.id);
        assert_eq!(enhanced.outcome, DispatchOutcome::Equalized);
        assert_eq!(decode(&enhanced.jpeg).unwrap().dimensions(), (32, 24));
    }

    #[test]
    fn enhance_capture_rejects_garbage() {
        let image = CapturedImage::new(EnhancementSelection::None, b"not a jpeg".to_vec());
        assert!(matches!(
            enhance_capture(&image, 80),
            Err(NectacamError::DecodeError(_))
        ));
    }

    #[tokio::test]
    async fn process_saves_to_gallery() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_in(dir.path());

        let image = CapturedImage::new(EnhancementSelection::ContrastStretching, textured());
        let expected_name = image.display_name("IMG_");
        let saved = pipeline.process(image).await.unwrap();

        assert!(saved.location.ends_with(&expected_name));
        assert_eq!(saved.outcome, DispatchOutcome::Stretched);
        assert_eq!(std::fs::read(&saved.location).unwrap().len(), saved.bytes);
        assert_eq!(pipeline.stats().snapshot().stretched, 1);
    }

    #[tokio::test]
    async fn failed_capture_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_in(dir.path());

        let image = CapturedImage::new(EnhancementSelection::None, Vec::new());
        assert!(pipeline.process(image).await.is_err());

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        let snap = pipeline.stats().snapshot();
        assert_eq!(snap.failures, 1);
        assert_eq!(snap.processed, 0);
    }

    /// Two shutter presses stamped in the same millisecond both reach the
    /// gallery under distinct names.
    #[tokio::test]
    async fn same_millisecond_captures_are_both_saved() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_in(dir.path());
        let at = DateTime::from_timestamp_millis(1_000).unwrap();

        let mut first = CapturedImage::new(EnhancementSelection::None, textured());
        first.captured_at = at;
        let mut second = CapturedImage::new(EnhancementSelection::HistogramEqualization, textured());
        second.captured_at = at;

        let first = pipeline.process(first).await.unwrap();
        let second = pipeline.process(second).await.unwrap();

        assert!(first.location.ends_with("IMG_1000.jpg"));
        assert!(second.location.ends_with("IMG_1000_1.jpg"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
        let snap = pipeline.stats().snapshot();
        assert_eq!(snap.processed, 2);
        assert_eq!(snap.failures, 0);
    }

    /// Each capture is enhanced with the selection it carried, even when the
    /// selections differ from one message to the next.
    #[tokio::test]
    async fn run_uses_each_captures_selection() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_in(dir.path());
        let (tx, rx) = mpsc::channel(4);

        let flat = jpeg_of(&PixelBuffer::filled(8, 8, [128, 128, 128]).unwrap());
        let selections = [
            (EnhancementSelection::HistogramEqualization, textured()),
            (EnhancementSelection::ContrastStretching, flat),
            (EnhancementSelection::None, textured()),
        ];
        for (i, (selection, jpeg)) in selections.into_iter().enumerate() {
            let mut image = CapturedImage::new(selection, jpeg);
            // Distinct millis keep the gallery names unique.
            image.captured_at = DateTime::from_timestamp_millis(1_000 + i as i64).unwrap();
            tx.send(image).await.unwrap();
        }
        drop(tx);

        let totals = pipeline.run(rx).await;
        assert_eq!(totals.processed, 3);
        assert_eq!(totals.equalized, 1);
        assert_eq!(totals.degenerate_fallbacks, 1);
        assert_eq!(totals.identity, 1);
        assert_eq!(totals.failures, 0);
    }
}
