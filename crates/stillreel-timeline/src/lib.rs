//! StillReel Timeline - what gets shown, and for how long
//!
//! Implements the inputs of a render:
//! - Lenient timeline text grammar (image id, frame count per line)
//! - Fixed-capacity slot registry holding the images
//! - Natural name ordering for batch uploads
//! - Concat demuxer scripts built from timeline + registry

pub mod concat;
pub mod natural;
pub mod parser;
pub mod slots;

pub use concat::{asset_ref_for, ConcatLine, ConcatScript, SCRIPT_NAME};
pub use natural::{natural_cmp, sort_naturally_by_key};
pub use parser::{
    count_timeline_frames, frames_to_seconds, parse_timeline, total_frames, TimelineEntry,
};
pub use slots::{Slot, SlotRegistry};
