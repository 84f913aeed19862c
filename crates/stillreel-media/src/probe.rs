//! Video probing through `ffprobe` without a full decode.

use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};
use stillreel_core::{ReelError, Result};
use tracing::debug;

/// What the sampler needs to know about a video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Native frame rate (frames per second).
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub duration_seconds: f64,
}

impl VideoMetadata {
    /// Clamp a timestamp into `[0, duration]`.
    pub fn clamp_timestamp(&self, t: f64) -> f64 {
        t.clamp(0.0, self.duration_seconds.max(0.0))
    }

    /// Start of the final frame. Nothing decodes past this point.
    pub fn last_frame_start(&self) -> f64 {
        let interval = if self.fps > 0.0 { 1.0 / self.fps } else { 0.0 };
        (self.duration_seconds - interval).max(0.0)
    }

    /// Where to decode for a playhead at `t`: clamped into the video, and
    /// held on the final frame once the playhead is inside it.
    pub fn decode_timestamp(&self, t: f64) -> f64 {
        self.clamp_timestamp(t).min(self.last_frame_start())
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse `"30000/1001"` or `"25"`; `"0/0"` yields `None`.
fn parse_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

fn parse_seconds(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}

/// Extract metadata for the first video stream from `ffprobe -of json` output.
pub fn parse_ffprobe_json(json: &[u8]) -> Result<VideoMetadata> {
    let output: ProbeOutput = serde_json::from_slice(json)
        .map_err(|e| ReelError::Serialization(format!("ffprobe output: {e}")))?;

    let stream = output
        .streams
        .iter()
        .find(|s| s.width.is_some() && s.height.is_some())
        .ok_or_else(|| ReelError::SeekFailure("no video stream found".into()))?;

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rate))
        .ok_or_else(|| ReelError::SeekFailure("video has no usable frame rate".into()))?;

    let duration_seconds = output
        .format
        .as_ref()
        .and_then(|f| parse_seconds(f.duration.as_deref()))
        .or_else(|| parse_seconds(stream.duration.as_deref()))
        .ok_or_else(|| ReelError::SeekFailure("video has no known duration".into()))?;

    Ok(VideoMetadata {
        fps,
        width: stream.width.unwrap_or_default(),
        height: stream.height.unwrap_or_default(),
        duration_seconds,
    })
}

/// Run `ffprobe` on a file. A missing file is `NotFound`; any other load
/// failure is a `SeekFailure`.
pub fn probe_video(path: &Path) -> Result<VideoMetadata> {
    if !path.exists() {
        return Err(ReelError::NotFound(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let output = Command::new(ffmpeg_sidecar::ffprobe::ffprobe_path())
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,avg_frame_rate,duration:format=duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| ReelError::SeekFailure(format!("failed to run ffprobe: {e}")))?;

    if !output.status.success() {
        return Err(ReelError::SeekFailure(format!(
            "ffprobe failed on {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let metadata = parse_ffprobe_json(&output.stdout)?;
    debug!(path = %path.display(), ?metadata, "Probed video");
    Ok(metadata)
}
