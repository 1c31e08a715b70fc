// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gallery backed by a plain directory, used on desktop and in tests.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use nectacam_bridge::NativeGallery;
use nectacam_core::error::{NectacamError, Result};
use tracing::{debug, info};

/// Saves images as files directly under one directory.
#[derive(Debug, Clone)]
pub struct DirectoryGallery {
    root: PathBuf,
}

impl DirectoryGallery {
    /// Use `root` as the gallery, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// A display name must be a bare file name.
fn validate_display_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(NectacamError::Storage(format!(
            "invalid display name {:?}",
            name
        )));
    }
    Ok(())
}

/// Highest `_N` suffix tried before giving up on a display name.
const MAX_NAME_SUFFIX: u32 = 9999;

/// `name` with `_n` inserted before the extension (`IMG_1.jpg` -> `IMG_1_2.jpg`).
fn suffixed_name(name: &str, n: u32) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{n}.{ext}"),
        _ => format!("{name}_{n}"),
    }
}

impl NativeGallery for DirectoryGallery {
    /// Saves under `display_name`, or `<stem>_1.<ext>`, `<stem>_2.<ext>`, ...
    /// when that name is taken. Existing photos are never overwritten.
    fn save_image(&self, display_name: &str, mime_type: &str, data: &[u8]) -> Result<String> {
        validate_display_name(display_name)?;

        for n in 0..=MAX_NAME_SUFFIX {
            let name = if n == 0 {
                display_name.to_string()
            } else {
                suffixed_name(display_name, n)
            };
            let path = self.root.join(&name);
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    debug!(name = %name, "Gallery name taken");
                    continue;
                }
                Err(err) => {
                    return Err(NectacamError::Storage(format!(
                        "cannot create {}: {}",
                        path.display(),
                        err
                    )));
                }
            };
            file.write_all(data)?;

            info!(path = %path.display(), mime_type, bytes = data.len(), "Image saved to gallery");
            return Ok(path.display().to_string());
        }

        Err(NectacamError::Storage(format!(
            "no free name for {:?} after {} attempts",
            display_name, MAX_NAME_SUFFIX
        )))
    }

    fn list_images(&self) -> Result<Vec<String>> {
        let mut images = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                images.push(entry.path().display().to_string());
            }
        }
        images.sort();
        debug!(count = images.len(), "Gallery listed");
        Ok(images)
    }
}
