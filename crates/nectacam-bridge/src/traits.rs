// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.
//
// Camera calls only start work on the device. Their results (device opened,
// session configured, JPEG ready, ...) arrive later as `CameraEvent`s on the
// channel handed to `open_camera`.

use nectacam_core::error::Result;
use nectacam_core::types::CaptureId;
use tokio::sync::mpsc;

/// Unified bridge that groups all native capabilities.
pub trait PlatformBridge: NativeCamera + NativePermissions + NativeGallery + Send + Sync {
    /// Human-readable platform name (e.g. "Android 14").
    fn platform_name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// Asynchronous notifications from the camera device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraEvent {
    /// The device finished opening.
    Opened,
    /// The device went away (unplugged, taken by another app).
    Disconnected,
    /// The device reported a fatal error code.
    Error(i32),
    /// The capture session is ready to stream.
    SessionConfigured,
    /// The capture session could not be configured.
    SessionConfigureFailed(String),
    /// A still capture request finished on the device side.
    CaptureCompleted,
    /// A still capture request failed.
    CaptureFailed(String),
    /// Encoded JPEG bytes of the latest still capture.
    ImageAvailable(Vec<u8>),
    /// The device finished closing.
    Closed,
}

/// Channel end the device uses to report `CameraEvent`s.
pub type CameraEventSender = mpsc::UnboundedSender<CameraEvent>;

/// An output resolution the sensor can stream at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFormat {
    Jpeg,
}

/// Still-capture stream the session is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    pub size: OutputSize,
    pub format: StreamFormat,
    /// Images the device may buffer before the consumer drains them.
    pub max_images: u32,
}

impl StreamConfig {
    /// JPEG stream at the first advertised size (1x1 when none are
    /// advertised) holding a single image.
    pub fn for_sizes(sizes: &[OutputSize]) -> Self {
        let size = sizes.first().copied().unwrap_or(OutputSize {
            width: 1,
            height: 1,
        });
        Self {
            size,
            format: StreamFormat::Jpeg,
            max_images: 1,
        }
    }
}

/// Single still capture submitted to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StillCaptureRequest {
    pub capture_id: CaptureId,
    /// Clockwise rotation, in degrees, to record in the JPEG.
    pub jpeg_orientation: u16,
}

/// Drive the device camera.
pub trait NativeCamera {
    /// Identifiers of the cameras on this device, in platform order.
    fn camera_ids(&self) -> Result<Vec<String>>;

    /// JPEG output sizes supported by a camera.
    fn output_sizes(&self, camera_id: &str) -> Result<Vec<OutputSize>>;

    /// Begin opening a camera. Events for this device go to `events`.
    fn open_camera(&self, camera_id: &str, events: CameraEventSender) -> Result<()>;

    /// Begin configuring the capture session on the open device.
    fn create_capture_session(&self, config: &StreamConfig) -> Result<()>;

    /// Start the repeating preview request.
    fn start_preview(&self) -> Result<()>;

    /// Submit a single still capture.
    fn capture_still(&self, request: &StillCaptureRequest) -> Result<()>;

    /// Begin closing the device. Completion is reported as `CameraEvent::Closed`.
    fn close_camera(&self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

/// Runtime camera permission.
pub trait NativePermissions {
    fn has_camera_permission(&self) -> bool;

    /// Ask the user for camera access. Returns whether it was granted.
    fn request_camera_permission(&self) -> Result<bool>;
}

// ---------------------------------------------------------------------------
// Gallery
// ---------------------------------------------------------------------------

/// Persist photos where the user's gallery app will find them.
pub trait NativeGallery {
    /// Store an image under `display_name` and return where it ended up.
    fn save_image(&self, display_name: &str, mime_type: &str, data: &[u8]) -> Result<String>;

    /// Locations of every image previously saved.
    fn list_images(&self) -> Result<Vec<String>>;
}
