// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where native camera APIs are unavailable.
//
// Every camera and gallery method returns `PlatformUnavailable`, and camera
// permission is never granted.

use nectacam_core::error::{NectacamError, Result};

use crate::traits::*;

/// No-op bridge returned on non-mobile platforms.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl NativeCamera for StubBridge {
    fn camera_ids(&self) -> Result<Vec<String>> {
        tracing::warn!("NativeCamera::camera_ids called on stub bridge");
        Err(NectacamError::PlatformUnavailable)
    }

    fn output_sizes(&self, _camera_id: &str) -> Result<Vec<OutputSize>> {
        Err(NectacamError::PlatformUnavailable)
    }

    fn open_camera(&self, _camera_id: &str, _events: CameraEventSender) -> Result<()> {
        tracing::warn!("NativeCamera::open_camera called on stub bridge");
        Err(NectacamError::PlatformUnavailable)
    }

    fn create_capture_session(&self, _config: &StreamConfig) -> Result<()> {
        Err(NectacamError::PlatformUnavailable)
    }

    fn start_preview(&self) -> Result<()> {
        Err(NectacamError::PlatformUnavailable)
    }

    fn capture_still(&self, _request: &StillCaptureRequest) -> Result<()> {
        tracing::warn!("NativeCamera::capture_still called on stub bridge");
        Err(NectacamError::PlatformUnavailable)
    }

    fn close_camera(&self) -> Result<()> {
        Err(NectacamError::PlatformUnavailable)
    }
}

impl NativePermissions for StubBridge {
    fn has_camera_permission(&self) -> bool {
        false
    }

    fn request_camera_permission(&self) -> Result<bool> {
        tracing::warn!("NativePermissions::request_camera_permission called on stub bridge");
        Ok(false)
    }
}

impl NativeGallery for StubBridge {
    fn save_image(&self, _display_name: &str, _mime_type: &str, _data: &[u8]) -> Result<String> {
        tracing::warn!("NativeGallery::save_image called on stub bridge");
        Err(NectacamError::PlatformUnavailable)
    }

    fn list_images(&self) -> Result<Vec<String>> {
        Err(NectacamError::PlatformUnavailable)
    }
}
