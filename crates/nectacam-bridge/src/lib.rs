// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// nectacam-bridge — Native platform bridge abstractions.
//
// Defines the camera, permission, and gallery capabilities the capture
// session depends on, and picks an implementation for the target OS. Only the
// desktop/CI stub ships here; device drivers plug in behind the same traits.

pub mod stub;
pub mod traits;

pub use traits::{
    CameraEvent, CameraEventSender, NativeCamera, NativeGallery, NativePermissions, OutputSize,
    PlatformBridge, StillCaptureRequest, StreamConfig, StreamFormat,
};

/// Retrieve the bridge implementation for the target operating system.
pub fn platform_bridge() -> Box<dyn PlatformBridge> {
    Box::new(stub::StubBridge)
}
