//! Frame rates and trim windows.
//!
//! Timestamps are plain `f64` seconds; they come from and go back to the
//! engine as decimal text, so no rational representation is kept for them.

use crate::error::{ReelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Frame rate as a rational number (e.g., 30000/1001 for 29.97 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g., 30000)
    pub numerator: u32,
    /// Denominator (e.g., 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Duration of a single frame in seconds.
    #[inline]
    pub fn frame_interval(self) -> f64 {
        self.denominator as f64 / self.numerator as f64
    }

    /// Seconds covered by `frames` frames at this rate.
    #[inline]
    pub fn frames_to_seconds(self, frames: u32) -> f64 {
        frames as f64 / self.to_fps_f64()
    }

    /// Value for the engine's `-r` argument: `30` or `30000/1001`.
    pub fn to_ffmpeg_arg(self) -> String {
        if self.denominator == 1 {
            self.numerator.to_string()
        } else {
            format!("{}/{}", self.numerator, self.denominator)
        }
    }

    /// Common frame rates
    pub const FPS_24: Self = Self::new(24, 1);
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
    pub const FPS_60: Self = Self::new(60, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}

impl FromStr for FrameRate {
    type Err = ReelError;

    /// Accepts `30` or `30000/1001`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ReelError::InvalidParameter(format!("Invalid frame rate: '{s}'"));
        let (num, den) = match s.trim().split_once('/') {
            Some((num, den)) => (num.trim(), den.trim()),
            None => (s.trim(), "1"),
        };
        let numerator: u32 = num.parse().map_err(|_| invalid())?;
        let denominator: u32 = den.parse().map_err(|_| invalid())?;
        if numerator == 0 || denominator == 0 {
            return Err(invalid());
        }
        Ok(Self::new(numerator, denominator))
    }
}

/// The `[start, end]` subrange of a source video eligible for sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimWindow {
    /// Start in seconds (inclusive)
    pub start: f64,
    /// End in seconds (inclusive)
    pub end: f64,
}

impl TrimWindow {
    /// Tail kept clear of the end when no explicit window is given.
    pub const DEFAULT_TAIL_MARGIN: f64 = 0.1;

    /// Create a window, rejecting `start > end` and non-finite bounds.
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(ReelError::InvalidParameter(format!(
                "Trim window bounds must be finite (got {start}..{end})"
            )));
        }
        if start > end {
            return Err(ReelError::InvalidParameter(format!(
                "Trim window start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The whole video minus a small tail margin.
    pub fn full(duration: f64) -> Self {
        Self {
            start: 0.0,
            end: (duration - Self::DEFAULT_TAIL_MARGIN).max(0.0),
        }
    }

    /// Clamp optional bounds into `[0, duration]`.
    ///
    /// A missing end defaults to the tail of [`TrimWindow::full`].
    pub fn clamped(start: Option<f64>, end: Option<f64>, duration: f64) -> Result<Self> {
        let start = start.unwrap_or(0.0).max(0.0);
        let end = match end {
            Some(end) => end.min(duration),
            None => Self::full(duration).end,
        };
        Self::new(start, end)
    }

    /// Length of the window in seconds.
    #[inline]
    pub fn length(self) -> f64 {
        self.end - self.start
    }

    /// Check if a timestamp lies inside the closed window.
    #[inline]
    pub fn contains(self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }
}
