//! Frame sampling: evenly spaced stills from a video, encoded as JPEG.
//!
//! A sampler owns the video's decode surface behind a mutex. A batch holds
//! the lock from its first seek to its last encode, so cycles never
//! interleave even when the sampler is shared between threads.

use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use parking_lot::Mutex;
use stillreel_core::{
    FrameRate, ImageAsset, RasterFrame, ReelError, Result, SharedVideo, TrimWindow,
};
use stillreel_timeline::SlotRegistry;
use tracing::{debug, info};

use crate::probe::VideoMetadata;
use crate::surface::{DecodeSurface, FfmpegSurface};

/// A captured still and the position the surface actually reached.
#[derive(Debug, Clone)]
pub struct SampledFrame {
    pub asset: ImageAsset,
    pub timestamp: f64,
}

/// Evenly spaced timestamps across `window`, both ends included.
///
/// One sample sits at the window start; zero samples is an empty list.
pub fn sample_timestamps(count: usize, window: TrimWindow) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![window.start],
        _ => {
            let span = window.end - window.start;
            let last = count - 1;
            (0..count)
                .map(|i| {
                    if i == last {
                        window.end
                    } else {
                        (window.start + span * i as f64 / last as f64).min(window.end)
                    }
                })
                .collect()
        }
    }
}

/// Where a single-frame capture actually seeks: an exact zero moves to the
/// middle of the first frame interval.
pub fn capture_timestamp(timestamp: f64, fps: FrameRate) -> f64 {
    if timestamp == 0.0 {
        fps.frame_interval() / 2.0
    } else {
        timestamp
    }
}

/// JPEG-encode a raster frame.
pub fn encode_jpeg(frame: &RasterFrame, quality: u8, name: impl Into<String>) -> Result<ImageAsset> {
    let name = name.into();
    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, quality.clamp(1, 100))
        .encode(
            frame.as_bytes(),
            frame.width,
            frame.height,
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| ReelError::asset_io(name.clone(), std::io::Error::other(e)))?;
    Ok(ImageAsset::new(name, data))
}

/// Samples frames from one shared video.
pub struct FrameSampler<S> {
    video: SharedVideo,
    surface: Mutex<S>,
    jpeg_quality: u8,
}

impl FrameSampler<FfmpegSurface> {
    /// Open an FFmpeg-backed sampler. Load failures surface as `SeekFailure`.
    pub fn open(video: SharedVideo, jpeg_quality: u8) -> Result<Self> {
        let surface = FfmpegSurface::open(&video)?;
        Ok(Self::new(video, surface, jpeg_quality))
    }
}

impl<S: DecodeSurface> FrameSampler<S> {
    pub fn new(video: SharedVideo, surface: S, jpeg_quality: u8) -> Self {
        Self {
            video,
            surface: Mutex::new(surface),
            jpeg_quality,
        }
    }

    pub fn video(&self) -> &SharedVideo {
        &self.video
    }

    pub fn metadata(&self) -> VideoMetadata {
        *self.surface.lock().metadata()
    }

    /// Trim window from optional bounds, clamped into the video.
    pub fn window(&self, start: Option<f64>, end: Option<f64>) -> Result<TrimWindow> {
        TrimWindow::clamped(start, end, self.metadata().duration_seconds)
    }

    /// Capture `count` evenly spaced frames inside `window`.
    ///
    /// Frames are named `frame_1.jpg`, `frame_2.jpg`, ... One failed cycle
    /// fails the whole batch.
    pub fn sample(&self, count: usize, window: TrimWindow) -> Result<Vec<SampledFrame>> {
        let mut surface = self.surface.lock();
        let duration = surface.metadata().duration_seconds;
        let window = TrimWindow::clamped(Some(window.start), Some(window.end), duration)?;
        let timestamps = sample_timestamps(count, window);

        info!(
            video = %self.video.display_name(),
            count,
            start = window.start,
            end = window.end,
            "Sampling frames"
        );

        let mut frames = Vec::with_capacity(timestamps.len());
        for (i, target) in timestamps.into_iter().enumerate() {
            let (raster, reached) = capture_cycle(&mut *surface, target)?;
            let asset = encode_jpeg(&raster, self.jpeg_quality, format!("frame_{}.jpg", i + 1))?;
            debug!(index = i + 1, target, reached, bytes = asset.len(), "Captured frame");
            frames.push(SampledFrame {
                asset,
                timestamp: reached,
            });
        }
        Ok(frames)
    }

    /// Capture a single frame at `timestamp`, named `frame_<ms>.jpg`.
    pub fn capture_at(&self, timestamp: f64, fps: FrameRate) -> Result<SampledFrame> {
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(ReelError::InvalidParameter(format!(
                "Capture timestamp must be a non-negative number (got {timestamp})"
            )));
        }
        let mut surface = self.surface.lock();
        let (raster, reached) = capture_cycle(&mut *surface, capture_timestamp(timestamp, fps))?;
        let name = format!("frame_{}.jpg", (timestamp * 1000.0).round() as u64);
        let asset = encode_jpeg(&raster, self.jpeg_quality, name)?;
        debug!(timestamp, reached, "Captured single frame");
        Ok(SampledFrame {
            asset,
            timestamp: reached,
        })
    }

    /// Fill every slot with frames spread over `window`, keeping provenance.
    pub fn autofill(&self, registry: &mut SlotRegistry, window: TrimWindow) -> Result<usize> {
        let frames = self.sample(registry.capacity(), window)?;
        let filled = frames.len();
        for (index, frame) in frames.into_iter().enumerate() {
            registry.assign_from_video_frame(
                index,
                frame.asset,
                Arc::clone(&self.video),
                frame.timestamp,
            )?;
        }
        info!(filled, video = %self.video.display_name(), "Auto-filled slots from video");
        Ok(filled)
    }

    /// Re-capture the frame in a slot that came from this sampler's video.
    ///
    /// The timestamp is clamped into the video; the slot keeps its
    /// provenance and records the clamped timestamp.
    pub fn repick(
        &self,
        registry: &mut SlotRegistry,
        index: usize,
        timestamp: f64,
        fps: FrameRate,
    ) -> Result<()> {
        let slot = registry.get(index).ok_or_else(|| {
            ReelError::InvalidParameter(format!("Slot index {index} out of range"))
        })?;
        match slot.source_video() {
            Some(source) if Arc::ptr_eq(source, &self.video) => {}
            Some(_) => {
                return Err(ReelError::InvalidParameter(format!(
                    "Slot {} was captured from a different video",
                    slot.id()
                )))
            }
            None => {
                return Err(ReelError::InvalidParameter(format!(
                    "Slot {} has no source video to pick from",
                    slot.id()
                )))
            }
        }
        if !timestamp.is_finite() {
            return Err(ReelError::InvalidParameter(format!(
                "Invalid timestamp {timestamp}"
            )));
        }

        let timestamp = self.metadata().clamp_timestamp(timestamp);
        let frame = self.capture_at(timestamp, fps)?;
        registry.assign_from_video_frame(index, frame.asset, Arc::clone(&self.video), timestamp)
    }
}

/// One seek + draw cycle. The caller holds the surface lock.
fn capture_cycle<S: DecodeSurface + ?Sized>(
    surface: &mut S,
    target: f64,
) -> Result<(RasterFrame, f64)> {
    let reached = surface.seek(target)?;
    let raster = surface.draw()?;
    Ok((raster, reached))
}
