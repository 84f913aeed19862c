//! Decode surfaces: seek a video and draw the frame under the playhead.

use std::path::PathBuf;

use ffmpeg_sidecar::command::FfmpegCommand;
use stillreel_core::{RasterFrame, ReelError, Result, VideoSource};
use tracing::debug;

use crate::probe::{probe_video, VideoMetadata};

/// A seekable video that can rasterize its current frame.
///
/// One seek/draw cycle at a time: callers hold exclusive access for the
/// whole cycle.
pub trait DecodeSurface: Send {
    fn metadata(&self) -> &VideoMetadata;

    /// Move the playhead. Returns the position actually reached.
    fn seek(&mut self, timestamp: f64) -> Result<f64>;

    /// Rasterize the frame at the playhead at the video's native size.
    fn draw(&mut self) -> Result<RasterFrame>;
}

/// Surface backed by one FFmpeg invocation per drawn frame.
#[derive(Debug)]
pub struct FfmpegSurface {
    path: PathBuf,
    metadata: VideoMetadata,
    position: Option<f64>,
}

impl FfmpegSurface {
    /// Probe the video and open a surface on it.
    pub fn open(video: &VideoSource) -> Result<Self> {
        let metadata = probe_video(video.path())?;
        if metadata.width == 0 || metadata.height == 0 {
            return Err(ReelError::SeekFailure(format!(
                "{} has no picture",
                video.display_name()
            )));
        }
        Ok(Self {
            path: video.path().to_path_buf(),
            metadata,
            position: None,
        })
    }

    /// Position handed to FFmpeg for the current playhead.
    fn decode_position(&self) -> Option<f64> {
        self.position.map(|p| self.metadata.decode_timestamp(p))
    }
}

impl DecodeSurface for FfmpegSurface {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn seek(&mut self, timestamp: f64) -> Result<f64> {
        if !timestamp.is_finite() {
            return Err(ReelError::SeekFailure(format!(
                "cannot seek to {timestamp}"
            )));
        }
        let position = self.metadata.clamp_timestamp(timestamp);
        self.position = Some(position);
        Ok(position)
    }

    fn draw(&mut self) -> Result<RasterFrame> {
        let position = self
            .decode_position()
            .ok_or_else(|| ReelError::SeekFailure("draw before seek".into()))?;

        // Rounded down so the seek never lands past the final frame's pts.
        let seek_arg = format!("{:.3}", (position * 1000.0).floor() / 1000.0);
        let mut child = FfmpegCommand::new()
            .seek(seek_arg)
            .input(&self.path)
            .frames(1)
            .rawvideo()
            .spawn()
            .map_err(|e| ReelError::SeekFailure(format!("failed to spawn ffmpeg: {e}")))?;

        let frames: Vec<_> = child
            .iter()
            .map_err(|e| ReelError::SeekFailure(format!("no ffmpeg output: {e}")))?
            .filter_frames()
            .collect();
        child.wait()?;

        let frame = frames.into_iter().next().ok_or_else(|| {
            ReelError::SeekFailure(format!("no frame decoded at {position:.3}s"))
        })?;
        debug!(position, width = frame.width, height = frame.height, "Decoded frame");
        RasterFrame::from_rgb(frame.width, frame.height, frame.data)
    }
}
