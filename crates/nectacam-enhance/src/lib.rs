// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// nectacam-enhance — Pixel-level enhancement for captured photos.
//
// Provides the two full-frame transforms (per-channel histogram equalization
// and luminance-range contrast stretching), the dispatcher that picks one by
// selection, and the codec adapter that moves between encoded bytes and
// decoded RGB pixel buffers.

pub mod enhance;
pub mod image;

// Re-export the primary entry points so callers can use `nectacam_enhance::apply` etc.
pub use enhance::contrast::{LuminanceRange, stretch};
pub use enhance::dispatch::{DispatchOutcome, Enhancement, apply, apply_label, apply_with_outcome};
pub use enhance::histogram::{ChannelHistogram, CumulativeHistogram, equalize};
pub use self::image::codec::{DEFAULT_JPEG_QUALITY, decode, encode, encode_png};
pub use self::image::processor::ImageProcessor;
