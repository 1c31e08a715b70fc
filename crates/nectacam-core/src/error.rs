// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for NectaCam.

use thiserror::Error;

/// Top-level error type for all NectaCam operations.
#[derive(Debug, Error)]
pub enum NectacamError {
    // -- Enhancement errors --
    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    #[error("degenerate luminance range: every pixel has luminance {luminance}")]
    DegenerateRange { luminance: u8 },

    // -- Codec boundary --
    #[error("image decoding failed: {0}")]
    DecodeError(String),

    #[error("image encoding failed: {0}")]
    EncodeError(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Camera errors --
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera access failed: {0}")]
    CameraAccess(String),

    #[error("capture session configuration failed: {0}")]
    SessionConfiguration(String),

    #[error("image capture failed: {0}")]
    CaptureFailed(String),

    #[error("cannot {action} while camera is {state}")]
    InvalidTransition { action: String, state: String },

    // -- Storage / persistence --
    #[error("gallery storage failed: {0}")]
    Storage(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NectacamError>;
