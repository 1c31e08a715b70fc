// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// nectacam-capture — From shutter press to saved photo.
//
// `session` drives the camera device through open, preview, capture, and
// close. `pipeline` takes each captured JPEG with the enhancement chosen at
// shutter time, enhances it off the async runtime, and saves it to a gallery.

pub mod gallery;
pub mod pipeline;
pub mod session;
pub mod stats;

pub use gallery::DirectoryGallery;
pub use pipeline::{CapturePipeline, CapturedImage, EnhancedCapture, SavedCapture, enhance_capture};
pub use session::{
    CameraHandle, CameraSession, SessionAction, SessionCommand, SessionDriver, SessionOutput,
    SessionState,
};
pub use stats::{CaptureStats, StatsSnapshot};
