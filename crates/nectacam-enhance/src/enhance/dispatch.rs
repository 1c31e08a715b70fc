// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Enhancement dispatch — routes a selection to its transform.

use nectacam_core::error::{NectacamError, Result};
use nectacam_core::types::{EnhancementSelection, PixelBuffer};
use tracing::{debug, instrument, warn};

use super::contrast::stretch;
use super::histogram::equalize;

/// What the dispatcher actually did with a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Histogram equalization was applied.
    Equalized,
    /// Contrast stretching was applied.
    Stretched,
    /// No enhancement was selected; the input was passed through.
    Identity,
    /// Contrast stretching was selected but the image is flat, so the input
    /// was passed through instead.
    DegenerateFallback,
}

/// A dispatched buffer together with the route it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enhancement {
    pub buffer: PixelBuffer,
    pub outcome: DispatchOutcome,
}

/// Apply the selected enhancement, reporting which route was taken.
///
/// `None` moves the input straight through without copying. A flat image
/// under `ContrastStretching` is returned unchanged with
/// `DispatchOutcome::DegenerateFallback`; every other error is propagated.
#[instrument(skip_all, fields(selection = %selection, width = buffer.width(), height = buffer.height()))]
pub fn apply_with_outcome(
    selection: EnhancementSelection,
    buffer: PixelBuffer,
) -> Result<Enhancement> {
    let enhancement = match selection {
        EnhancementSelection::HistogramEqualization => Enhancement {
            buffer: equalize(&buffer)?,
            outcome: DispatchOutcome::Equalized,
        },
        EnhancementSelection::ContrastStretching => match stretch(&buffer) {
            Ok(stretched) => Enhancement {
                buffer: stretched,
                outcome: DispatchOutcome::Stretched,
            },
            Err(NectacamError::DegenerateRange { luminance }) => {
                warn!(
                    luminance,
                    "Flat image cannot be contrast stretched; returning it unchanged"
                );
                Enhancement {
                    buffer,
                    outcome: DispatchOutcome::DegenerateFallback,
                }
            }
            Err(err) => return Err(err),
        },
        EnhancementSelection::None => {
            debug!("No enhancement selected");
            Enhancement {
                buffer,
                outcome: DispatchOutcome::Identity,
            }
        }
    };
    Ok(enhancement)
}

/// Apply the selected enhancement and return only the resulting buffer.
pub fn apply(selection: EnhancementSelection, buffer: PixelBuffer) -> Result<PixelBuffer> {
    apply_with_outcome(selection, buffer).map(|enhancement| enhancement.buffer)
}

/// Apply the enhancement named by a picker label; unknown or missing labels
/// pass the buffer through unchanged.
pub fn apply_label(label: Option<&str>, buffer: PixelBuffer) -> Result<PixelBuffer> {
    apply(EnhancementSelection::from_label(label), buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PixelBuffer {
        PixelBuffer::from_fn(16, 9, |x, y| [(x * 12) as u8, (y * 25) as u8, ((x + y) * 5) as u8])
            .unwrap()
    }

    #[test]
    fn histogram_label_routes_to_equalize() {
        let buf = sample();
        let expected = equalize(&buf).unwrap();
        assert_eq!(apply_label(Some("Histogram Equalization"), buf).unwrap(), expected);
    }

    #[test]
    fn contrast_label_routes_to_stretch() {
        let buf = sample();
        let expected = stretch(&buf).unwrap();
        assert_eq!(apply_label(Some("Contrast Stretching"), buf).unwrap(), expected);
    }

    #[test]
    fn anything_else_is_identity() {
        for label in [Some("anything else"), Some(""), Some("None"), None] {
            let buf = sample();
            let out = apply_with_outcome(EnhancementSelection::from_label(label), buf.clone())
                .unwrap();
            assert_eq!(out.outcome, DispatchOutcome::Identity);
            assert_eq!(out.buffer, buf);
        }
    }

    #[test]
    fn flat_image_falls_back_to_identity() {
        let buf = PixelBuffer::filled(4, 4, [77, 77, 77]).unwrap();
        let out = apply_with_outcome(EnhancementSelection::ContrastStretching, buf.clone()).unwrap();
        assert_eq!(out.outcome, DispatchOutcome::DegenerateFallback);
        assert_eq!(out.buffer, buf);
    }

    #[test]
    fn outcomes_name_the_transform() {
        let eq = apply_with_outcome(EnhancementSelection::HistogramEqualization, sample()).unwrap();
        assert_eq!(eq.outcome, DispatchOutcome::Equalized);
        let st = apply_with_outcome(EnhancementSelection::ContrastStretching, sample()).unwrap();
        assert_eq!(st.outcome, DispatchOutcome::Stretched);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    /// Buffers can cross threads and the transforms hold no shared state, so
    /// independent buffers can be enhanced at the same time.
    #[test]
    fn transforms_run_concurrently_on_independent_buffers() {
        assert_send_sync::<PixelBuffer>();

        let buffers: Vec<PixelBuffer> = (0..4u32)
            .map(|seed| {
                PixelBuffer::from_fn(40, 30, |x, y| {
                    [(x * 5 + seed) as u8, (y * 7 + seed * 3) as u8, ((x + y) * 2) as u8]
                })
                .unwrap()
            })
            .collect();
        let expected: Vec<_> = buffers
            .iter()
            .map(|buf| (equalize(buf).unwrap(), stretch(buf).unwrap()))
            .collect();

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = buffers
                .iter()
                .map(|buf| scope.spawn(move || (equalize(buf).unwrap(), stretch(buf).unwrap())))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results, expected);
    }
}
