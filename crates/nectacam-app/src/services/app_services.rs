// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — loads configuration, opens the gallery, and runs
// enhance and capture requests on behalf of the command-line front-end.
//
// The config sits behind `Arc<Mutex<>>` so the services can be cloned into
// spawned tasks; every access is a short copy in or out.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nectacam_bridge::{NativeGallery, PlatformBridge, platform_bridge};
use nectacam_capture::{
    CapturePipeline, CaptureStats, CapturedImage, DirectoryGallery, SessionDriver, SessionOutput,
    SessionState, StatsSnapshot,
};
use nectacam_core::error::{NectacamError, Result};
use nectacam_core::types::EnhancementSelection;
use nectacam_core::AppConfig;
use nectacam_enhance::{DispatchOutcome, ImageProcessor};
use tracing::{debug, info, instrument, warn};

use super::data_dir;

const CONFIG_FILE: &str = "config.json";

/// Longest wait for the camera to deliver a still after opening.
const CAPTURE_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of one enhance or capture request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub location: String,
    pub outcome: DispatchOutcome,
    pub stats: StatsSnapshot,
}

/// Shared application services.
#[derive(Clone)]
pub struct AppServices {
    data_dir: PathBuf,
    config: Arc<Mutex<AppConfig>>,
    gallery: Arc<DirectoryGallery>,
    bridge: Arc<dyn PlatformBridge>,
    stats: Arc<CaptureStats>,
}

impl AppServices {
    /// Initialise services in the platform data directory.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir()?;
        Self::open(dir, Arc::from(platform_bridge()))
    }

    /// Initialise services rooted at `dir` with an explicit bridge.
    pub fn open(dir: PathBuf, bridge: Arc<dyn PlatformBridge>) -> Result<Self> {
        info!(path = %dir.display(), platform = bridge.platform_name(), "initialising app services");

        let config = load_config(&dir);
        let gallery = DirectoryGallery::new(dir.join(data_dir::GALLERY_DIR))?;

        Ok(Self {
            data_dir: dir,
            config: Arc::new(Mutex::new(config)),
            gallery: Arc::new(gallery),
            bridge,
            stats: Arc::new(CaptureStats::new()),
        })
    }

    // -- Configuration --------------------------------------------------------

    /// Get a snapshot of the current config.
    pub fn config(&self) -> AppConfig {
        self.config.lock().expect("config lock poisoned").clone()
    }

    /// Validate, update, and persist the config.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        config.validate()?;
        persist_config(&self.data_dir, config)?;
        *self.config.lock().expect("config lock poisoned") = config.clone();
        Ok(())
    }

    pub fn set_default_enhancement(&self, selection: EnhancementSelection) -> Result<AppConfig> {
        let config = AppConfig {
            default_enhancement: selection,
            ..self.config()
        };
        self.save_config(&config)?;
        Ok(config)
    }

    pub fn set_jpeg_quality(&self, quality: u8) -> Result<AppConfig> {
        let config = AppConfig {
            jpeg_quality: quality,
            ..self.config()
        };
        self.save_config(&config)?;
        Ok(config)
    }

    // -- Gallery --------------------------------------------------------------

    pub fn gallery_dir(&self) -> &Path {
        self.gallery.root()
    }

    pub fn list_gallery(&self) -> Result<Vec<String>> {
        self.gallery.list_images()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn pipeline(&self, quality: u8) -> CapturePipeline {
        let config = self.config();
        let gallery: Arc<dyn NativeGallery + Send + Sync> = self.gallery.clone();
        CapturePipeline::new(gallery, quality, config.file_name_prefix)
            .with_stats(Arc::clone(&self.stats))
    }

    // -- Enhancement ----------------------------------------------------------

    /// Enhance an image file.
    ///
    /// With `out`, the result is written there (format by extension).
    /// Otherwise it is saved to the gallery under a generated name, exactly
    /// like a camera capture.
    #[instrument(skip_all, fields(input = %input.display(), selection = ?selection))]
    pub async fn enhance_file(
        &self,
        input: &Path,
        selection: Option<EnhancementSelection>,
        out: Option<&Path>,
        quality: Option<u8>,
    ) -> Result<Report> {
        let config = self.config();
        let selection = selection.unwrap_or(config.default_enhancement);
        let quality = quality.unwrap_or(config.jpeg_quality);
        let data = tokio::fs::read(input).await?;

        let Some(out) = out else {
            let saved = self
                .pipeline(quality)
                .process(CapturedImage::new(selection, data))
                .await?;
            return Ok(Report {
                location: saved.location,
                outcome: saved.outcome,
                stats: self.stats(),
            });
        };

        let out = out.to_path_buf();
        let location = out.display().to_string();
        let result = tokio::task::spawn_blocking(move || -> Result<DispatchOutcome> {
            let (processor, outcome) =
                ImageProcessor::from_bytes(&data)?.enhance_with_outcome(selection)?;
            processor.save(&out, quality)?;
            Ok(outcome)
        })
        .await
        .map_err(|err| NectacamError::EncodeError(format!("enhancement task failed: {}", err)))?;

        match result {
            Ok(outcome) => {
                self.stats.record(outcome);
                info!(location = %location, ?outcome, "Enhanced image written");
                Ok(Report {
                    location,
                    outcome,
                    stats: self.stats(),
                })
            }
            Err(err) => {
                self.stats.record_failure();
                Err(err)
            }
        }
    }

    // -- Capture --------------------------------------------------------------

    /// Open the camera, take one still, close the camera, and save the
    /// enhanced result to the gallery.
    #[instrument(skip(self))]
    pub async fn capture_once(&self, selection: Option<EnhancementSelection>) -> Result<Report> {
        let config = self.config();
        let selection = selection.unwrap_or(config.default_enhancement);

        let (driver, handle, mut outputs) = SessionDriver::new(
            Arc::clone(&self.bridge),
            config.camera_index,
            config.display_rotation,
        );
        let task = driver.spawn();

        handle.open().await?;
        let shutter = async {
            let mut requested = false;
            loop {
                match outputs.recv().await {
                    Some(SessionOutput::StateChanged(SessionState::PreviewRunning))
                        if !requested =>
                    {
                        if let Err(err) = handle.capture(selection).await {
                            return Err(err);
                        }
                        requested = true;
                    }
                    Some(SessionOutput::StateChanged(state)) => {
                        debug!(%state, "Camera state");
                    }
                    Some(SessionOutput::Captured(image)) => return Ok(image),
                    Some(SessionOutput::Failed(err)) => return Err(err),
                    None => {
                        return Err(NectacamError::CaptureFailed(
                            "camera session ended before an image arrived".into(),
                        ));
                    }
                }
            }
        };
        let captured = match tokio::time::timeout(CAPTURE_TIMEOUT, shutter).await {
            Ok(result) => result,
            Err(_) => Err(NectacamError::CaptureFailed(format!(
                "no image within {} seconds",
                CAPTURE_TIMEOUT.as_secs()
            ))),
        };

        if let Err(err) = handle.close().await {
            warn!(error = %err, "Camera session already gone");
        }
        drop(handle);
        if let Err(err) = task.await {
            warn!(error = %err, "Camera session task failed");
        }

        let saved = self.pipeline(config.jpeg_quality).process(captured?).await?;
        Ok(Report {
            location: saved.location,
            outcome: saved.outcome,
            stats: self.stats(),
        })
    }
}

/// Read the persisted config, falling back to defaults when it is missing
/// or unusable.
fn load_config(data_dir: &Path) -> AppConfig {
    let path = data_dir.join(CONFIG_FILE);
    let Ok(data) = std::fs::read_to_string(&path) else {
        return AppConfig::default();
    };
    match serde_json::from_str::<AppConfig>(&data) {
        Ok(config) if config.validate().is_ok() => config,
        Ok(_) | Err(_) => {
            warn!(path = %path.display(), "ignoring unusable config file");
            AppConfig::default()
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
