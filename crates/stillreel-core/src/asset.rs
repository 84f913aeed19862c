//! Media assets handled by StillReel.
//!
//! Still images and audio tracks are owned byte buffers: whoever holds the
//! value owns the resource and dropping it releases it. Source videos are
//! shared through [`SharedVideo`] because several slots may point back at the
//! same file.

use crate::error::{ReelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Coarse classification of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    Unknown,
}

impl MediaKind {
    /// Classify by file extension (case-insensitive).
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" | "jpg" | "jpeg" | "webp" | "bmp" | "gif" | "tif" | "tiff" => Self::Image,
            "mp3" | "wav" | "m4a" | "aac" | "ogg" | "oga" | "flac" | "opus" => Self::Audio,
            "mp4" | "mov" | "m4v" | "mkv" | "webm" | "avi" => Self::Video,
            _ => Self::Unknown,
        }
    }

    /// MIME type prefix used at the input boundary (`image/`, `audio/`, `video/`).
    pub fn mime_prefix(self) -> Option<&'static str> {
        match self {
            Self::Image => Some("image/"),
            Self::Audio => Some("audio/"),
            Self::Video => Some("video/"),
            Self::Unknown => None,
        }
    }
}

fn read_named(path: &Path) -> Result<(String, Vec<u8>)> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    let data = std::fs::read(path).map_err(|e| ReelError::asset_io(&name, e))?;
    Ok((name, data))
}

/// An owned still image (uploaded file or captured video frame).
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Display / sort name, e.g. `10.jpg` or `frame_3.jpg`
    pub name: String,
    /// Encoded image bytes
    pub data: Vec<u8>,
}

impl ImageAsset {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Read an image file into memory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let (name, data) = read_named(path.as_ref())?;
        Ok(Self { name, data })
    }

    /// Size of the encoded bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("name", &self.name)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// An owned audio track.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioAsset {
    /// File name; its extension selects the VFS key
    pub name: String,
    /// Encoded audio bytes
    pub data: Vec<u8>,
}

impl AudioAsset {
    /// Extension used when the name carries none.
    pub const DEFAULT_EXTENSION: &'static str = "mp3";

    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Read an audio file into memory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let (name, data) = read_named(path.as_ref())?;
        Ok(Self { name, data })
    }

    /// Lowercased extension of the name, or `mp3`.
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| Self::DEFAULT_EXTENSION.to_string())
    }
}

impl fmt::Debug for AudioAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioAsset")
            .field("name", &self.name)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// A source video on disk. Always handled through [`SharedVideo`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct VideoSource {
    path: PathBuf,
}

/// Reference-counted handle to a source video.
pub type SharedVideo = Arc<VideoSource>;

impl VideoSource {
    /// Open a shared handle to a video file. The file must exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<SharedVideo> {
        let path = path.into();
        if !path.exists() {
            return Err(ReelError::NotFound(format!(
                "Video not found: {}",
                path.display()
            )));
        }
        Ok(Arc::new(Self { path }))
    }

    /// Create a handle without touching the filesystem.
    pub fn unchecked(path: impl Into<PathBuf>) -> SharedVideo {
        Arc::new(Self { path: path.into() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used for logging.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    /// Read the whole file, e.g. to hand it to the engine.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.path).map_err(|e| ReelError::asset_io(self.display_name(), e))
    }
}
