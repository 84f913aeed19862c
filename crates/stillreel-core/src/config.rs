//! Render configuration, persisted as JSON.

use crate::error::{ReelError, Result};
use crate::time::FrameRate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default number of image slots.
pub const DEFAULT_SLOT_COUNT: usize = 14;

/// Default JPEG quality for captured frames.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// User-tunable settings. Every field has a default, so a config file only
/// needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    /// Output frame rate; also converts timeline frame counts to seconds.
    pub fps: FrameRate,
    /// Number of slots in the registry.
    pub slot_count: usize,
    /// JPEG quality (1-100) for frames captured from video.
    pub jpeg_quality: u8,
    /// Download an FFmpeg build when none is installed.
    pub auto_download_engine: bool,
    /// Parent directory for engine sessions (system temp dir when unset).
    pub work_dir: Option<PathBuf>,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            fps: FrameRate::FPS_30,
            slot_count: DEFAULT_SLOT_COUNT,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            auto_download_engine: false,
            work_dir: None,
        }
    }
}

impl ReelConfig {
    /// Parse from JSON bytes and validate.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)
            .map_err(|e| ReelError::Serialization(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| ReelError::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Load config from a file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading config");
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }

    /// Save config to a file path.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// `<config dir>/stillreel/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("stillreel").join("config.json"))
    }

    /// Load from [`ReelConfig::default_path`] when present, else defaults.
    pub fn load_or_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Reject values the render path cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.fps.numerator == 0 || self.fps.denominator == 0 {
            return Err(ReelError::InvalidParameter(format!(
                "fps must be positive (got {}/{})",
                self.fps.numerator, self.fps.denominator
            )));
        }
        if self.slot_count == 0 {
            return Err(ReelError::InvalidParameter(
                "slot_count must be at least 1".into(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ReelError::InvalidParameter(format!(
                "jpeg_quality must be within 1..=100 (got {})",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}
