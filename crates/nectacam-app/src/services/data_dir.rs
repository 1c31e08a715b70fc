// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::PathBuf;

const APP_DIR: &str = "nectacam";

/// Subdirectory holding saved photos.
pub const GALLERY_DIR: &str = "gallery";

/// Return the application data directory, creating it if needed.
///
/// `$XDG_DATA_HOME/nectacam`, else `$HOME/.local/share/nectacam`, else
/// `/tmp/nectacam`. On mobile the platform bridge owns storage instead.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = resolve(
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    );
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Pick the data directory from the XDG and home locations, if set.
fn resolve(xdg_data_home: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    let base = xdg_data_home
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| home.map(|h| h.join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    base.join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_wins() {
        let dir = resolve(Some("/xdg".into()), Some("/home/u".into()));
        assert_eq!(dir, PathBuf::from("/xdg/nectacam"));
    }

    #[test]
    fn home_fallback() {
        let dir = resolve(None, Some("/home/u".into()));
        assert_eq!(dir, PathBuf::from("/home/u/.local/share/nectacam"));

        let dir = resolve(Some(PathBuf::new()), Some("/home/u".into()));
        assert_eq!(dir, PathBuf::from("/home/u/.local/share/nectacam"));
    }

    #[test]
    fn tmp_last_resort() {
        assert_eq!(resolve(None, None), PathBuf::from("/tmp/nectacam"));
    }
}
