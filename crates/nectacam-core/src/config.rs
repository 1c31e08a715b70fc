// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};

use crate::error::{NectacamError, Result};
use crate::types::{EnhancementSelection, SurfaceRotation};

/// Highest JPEG quality the encoder accepts.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Enhancement pre-selected in the picker.
    pub default_enhancement: EnhancementSelection,
    /// JPEG quality for saved captures (0-100).
    pub jpeg_quality: u8,
    /// Prefix of generated gallery file names (`IMG_1700000000000.jpg`).
    pub file_name_prefix: String,
    /// Index into the list of camera ids reported by the device.
    pub camera_index: usize,
    /// Current display rotation, used to pick the JPEG orientation.
    pub display_rotation: SurfaceRotation,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_enhancement: EnhancementSelection::None,
            jpeg_quality: MAX_JPEG_QUALITY,
            file_name_prefix: "IMG_".into(),
            camera_index: 0,
            display_rotation: SurfaceRotation::Rotation0,
        }
    }
}

impl AppConfig {
    /// Reject settings that would produce unusable output.
    pub fn validate(&self) -> Result<()> {
        if self.jpeg_quality > MAX_JPEG_QUALITY {
            return Err(NectacamError::InvalidConfig(format!(
                "jpeg_quality must be at most {MAX_JPEG_QUALITY}, got {}",
                self.jpeg_quality
            )));
        }
        if self.file_name_prefix.is_empty() {
            return Err(NectacamError::InvalidConfig(
                "file_name_prefix must not be empty".into(),
            ));
        }
        if self.file_name_prefix.contains(['/', '\\']) {
            return Err(NectacamError::InvalidConfig(format!(
                "file_name_prefix must not contain path separators: {:?}",
                self.file_name_prefix
            )));
        }
        Ok(())
    }
}
