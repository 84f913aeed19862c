//! Memory estimate shown next to the timeline.

/// Bytes in one megabyte for the estimate.
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Megabytes needed to hold `frame_count` uncompressed RGBA frames of
/// `width` x `height`, rounded to the nearest whole megabyte.
///
/// Display only; nothing in the render path consults it.
pub fn estimate_memory_mb(width: u32, height: u32, frame_count: u64) -> u64 {
    let bytes = width as f64 * height as f64 * 4.0 * frame_count as f64;
    (bytes / BYTES_PER_MB).round() as u64
}
