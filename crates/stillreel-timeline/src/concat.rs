//! Concat demuxer script generation.
//!
//! The concat demuxer ignores the `duration` of the last listed file, so the
//! final image is listed once more without a duration. That repeat is what
//! makes the last entry actually last `frame_count / fps` seconds.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use stillreel_core::FrameRate;

use crate::parser::TimelineEntry;
use crate::slots::SlotRegistry;

/// VFS name of the concat script.
pub const SCRIPT_NAME: &str = "list.txt";

/// VFS name under which a slot's image is written.
pub fn asset_ref_for(slot_id: u32) -> String {
    format!("image_{slot_id}.png")
}

/// One logical line of the script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConcatLine {
    /// A file shown for `duration_seconds`.
    Entry {
        asset_ref: String,
        duration_seconds: f64,
    },
    /// The last file repeated without a duration.
    TrailingRepeat { asset_ref: String },
}

impl ConcatLine {
    pub fn asset_ref(&self) -> &str {
        match self {
            Self::Entry { asset_ref, .. } | Self::TrailingRepeat { asset_ref } => asset_ref,
        }
    }
}

/// Ordered concat script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcatScript {
    pub lines: Vec<ConcatLine>,
}

impl ConcatScript {
    /// Build the script for `timeline` against the images in `registry`.
    ///
    /// Entries whose image id has no populated slot are skipped. When at least
    /// one entry remains, the last one is repeated.
    pub fn build(timeline: &[TimelineEntry], registry: &SlotRegistry, fps: FrameRate) -> Self {
        let mut lines: Vec<ConcatLine> = timeline
            .iter()
            .filter(|entry| registry.asset_for_id(entry.image_id).is_some())
            .map(|entry| ConcatLine::Entry {
                asset_ref: asset_ref_for(entry.image_id),
                duration_seconds: entry.duration_seconds(fps),
            })
            .collect();

        if let Some(last) = lines.last() {
            let asset_ref = last.asset_ref().to_string();
            lines.push(ConcatLine::TrailingRepeat { asset_ref });
        }

        Self { lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of `Entry` lines.
    pub fn entry_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, ConcatLine::Entry { .. }))
            .count()
    }

    /// Total scripted duration in seconds.
    pub fn total_seconds(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| match l {
                ConcatLine::Entry {
                    duration_seconds, ..
                } => *duration_seconds,
                ConcatLine::TrailingRepeat { .. } => 0.0,
            })
            .sum()
    }

    /// Script text in concat demuxer syntax.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                ConcatLine::Entry {
                    asset_ref,
                    duration_seconds,
                } => {
                    let _ = writeln!(out, "file {asset_ref}");
                    let _ = writeln!(out, "duration {duration_seconds}");
                }
                ConcatLine::TrailingRepeat { asset_ref } => {
                    let _ = writeln!(out, "file {asset_ref}");
                }
            }
        }
        out
    }
}
