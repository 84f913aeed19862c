//! Timeline text grammar.
//!
//! One entry per line: `<image> <frames> [ignored...]`. The image id is the
//! leading run of digits of the first token (`4_closeup` is image 4) and the
//! frame count is the integer prefix of the second token. Parsing never
//! fails: a line with fewer than two tokens is skipped, an id without digits
//! becomes `1` and an unreadable or non-positive count becomes `1`.

use serde::{Deserialize, Serialize};
use stillreel_core::FrameRate;

/// Image id used when the first token has no leading digits.
pub const DEFAULT_IMAGE_ID: u32 = 1;

/// Frame count used when the second token is not an integer.
pub const DEFAULT_FRAME_COUNT: u32 = 1;

/// How long one image stays on screen, in frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Slot id (1-based) of the image to show
    pub image_id: u32,
    /// Number of output frames
    pub frame_count: u32,
}

impl TimelineEntry {
    pub const fn new(image_id: u32, frame_count: u32) -> Self {
        Self {
            image_id,
            frame_count,
        }
    }

    /// On-screen duration at the given rate.
    pub fn duration_seconds(self, fps: FrameRate) -> f64 {
        frames_to_seconds(self.frame_count, fps)
    }
}

/// Parse timeline text into entries, in line order.
pub fn parse_timeline(text: &str) -> Vec<TimelineEntry> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<TimelineEntry> {
    let mut tokens = line.split_whitespace();
    let id_token = tokens.next()?;
    let count_token = tokens.next()?;

    let image_id = leading_digits(id_token)
        .map(saturating_u32)
        .unwrap_or(DEFAULT_IMAGE_ID);
    let frame_count = parse_int_prefix(count_token).unwrap_or(DEFAULT_FRAME_COUNT);

    Some(TimelineEntry {
        image_id,
        frame_count,
    })
}

fn leading_digits(token: &str) -> Option<&str> {
    let end = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    (end > 0).then(|| &token[..end])
}

/// Lenient integer read: optional `+`, then leading digits; trailing junk
/// (`3fps`, `2.5`) is ignored. Zero and negative counts yield `None`, so
/// every entry keeps at least one frame on screen.
fn parse_int_prefix(token: &str) -> Option<u32> {
    let unsigned = token.strip_prefix('+').unwrap_or(token);
    leading_digits(unsigned)
        .map(saturating_u32)
        .filter(|&count| count > 0)
}

fn saturating_u32(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

/// Sum of all frame counts; the denominator for render progress.
pub fn total_frames(entries: &[TimelineEntry]) -> u64 {
    entries.iter().map(|e| e.frame_count as u64).sum()
}

/// Parse and count in one step.
pub fn count_timeline_frames(text: &str) -> u64 {
    total_frames(&parse_timeline(text))
}

/// Seconds covered by `frame_count` frames.
pub fn frames_to_seconds(frame_count: u32, fps: FrameRate) -> f64 {
    fps.frames_to_seconds(frame_count)
}
