//! StillReel Core - Foundation types
//!
//! This crate provides the types shared by every StillReel crate:
//! - Error taxonomy (ReelError, CleanupWarning)
//! - Frame rates and trim windows
//! - Owned image/audio assets and shared source videos
//! - Decoded raster frames
//! - Render configuration and the memory estimate

pub mod asset;
pub mod config;
pub mod error;
pub mod estimate;
pub mod frame;
pub mod time;

pub use asset::{AudioAsset, ImageAsset, MediaKind, SharedVideo, VideoSource};
pub use config::{ReelConfig, DEFAULT_JPEG_QUALITY, DEFAULT_SLOT_COUNT};
pub use error::{CleanupWarning, ReelError, Result};
pub use estimate::estimate_memory_mb;
pub use frame::RasterFrame;
pub use time::{FrameRate, TrimWindow};
