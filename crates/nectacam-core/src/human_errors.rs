// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the capture front-end.
//
// Every technical error is mapped to a short toast-style message with a
// suggestion. The severity drives how prominently the front-end shows it.

use crate::error::NectacamError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Camera hiccup — pressing the shutter again will probably work.
    Transient,
    /// User must do something (grant permission, free storage, pick a file).
    ActionRequired,
    /// Retrying will not help — bad input or a missing platform feature.
    Permanent,
}

/// A human-readable error with a plain English message and a suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Short summary (shown as the toast text).
    pub message: String,
    /// What the user should try next.
    pub suggestion: String,
    /// Whether pressing the shutter again is worthwhile.
    pub retriable: bool,
    /// Severity level.
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.message, self.suggestion)
    }
}

fn human(message: &str, suggestion: String, retriable: bool, severity: Severity) -> HumanError {
    HumanError {
        message: message.into(),
        suggestion,
        retriable,
        severity,
    }
}

/// Convert a `NectacamError` into a `HumanError`.
pub fn humanize_error(err: &NectacamError) -> HumanError {
    match err {
        // -- Enhancement --
        NectacamError::InvalidBuffer(detail) => human(
            "The photo could not be processed.",
            format!("The image data was incomplete. Try taking the photo again. ({detail})"),
            true,
            Severity::Transient,
        ),

        // Normally absorbed by the dispatcher; only reaches the user when a
        // caller stretches directly.
        NectacamError::DegenerateRange { .. } => human(
            "This photo has no contrast to stretch.",
            "Every pixel has the same brightness. Try a different enhancement.".into(),
            false,
            Severity::Permanent,
        ),

        // -- Codec --
        NectacamError::DecodeError(detail) => human(
            "The photo could not be read.",
            format!("The file may be damaged or in an unsupported format. ({detail})"),
            false,
            Severity::Permanent,
        ),

        NectacamError::EncodeError(detail) => human(
            "The photo could not be saved.",
            format!("Try taking the photo again. ({detail})"),
            true,
            Severity::Transient,
        ),

        NectacamError::InvalidConfig(detail) => human(
            "A setting is not valid.",
            format!("Check your settings and try again. ({detail})"),
            false,
            Severity::ActionRequired,
        ),

        // -- Camera --
        NectacamError::PermissionDenied => human(
            "Camera permission denied",
            "Allow camera access in the system settings, then open the camera again.".into(),
            false,
            Severity::ActionRequired,
        ),

        NectacamError::CameraAccess(detail) => human(
            "The camera could not be opened.",
            format!("Another app may be using it. Close other camera apps and try again. ({detail})"),
            true,
            Severity::Transient,
        ),

        NectacamError::SessionConfiguration(detail) => human(
            "Failed to configure camera capture session",
            format!("Close the camera and open it again. ({detail})"),
            true,
            Severity::Transient,
        ),

        NectacamError::CaptureFailed(detail) => human(
            "Failed to capture image",
            format!("Hold still and press the shutter again. ({detail})"),
            true,
            Severity::Transient,
        ),

        NectacamError::InvalidTransition { action, state } => human(
            "The camera is busy.",
            format!("Wait a moment before trying to {action} (camera is {state})."),
            true,
            Severity::Transient,
        ),

        // -- Storage --
        NectacamError::Storage(detail) => human(
            "The photo could not be added to the gallery.",
            format!("Check that there is free space on the device. ({detail})"),
            false,
            Severity::ActionRequired,
        ),

        NectacamError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => human(
                "The file could not be found.",
                "Check the file name and try again.".into(),
                false,
                Severity::ActionRequired,
            ),
            std::io::ErrorKind::PermissionDenied => human(
                "Access to the file was refused.",
                "Check the folder permissions and try again.".into(),
                false,
                Severity::ActionRequired,
            ),
            _ => human(
                "Reading or writing a file failed.",
                format!("Try again. ({io_err})"),
                true,
                Severity::Transient,
            ),
        },

        NectacamError::Serialization(detail) => human(
            "The settings file is damaged.",
            format!("Reset the settings to their defaults. ({detail})"),
            false,
            Severity::ActionRequired,
        ),

        // -- Platform --
        NectacamError::Bridge(detail) => human(
            "The device reported an error.",
            format!("Restart the app and try again. ({detail})"),
            true,
            Severity::Transient,
        ),

        NectacamError::PlatformUnavailable => human(
            "This device has no supported camera.",
            "Use `nectacam enhance` to enhance an existing photo instead.".into(),
            false,
            Severity::Permanent,
        ),
    }
}
