//! Integration tests for frame sampling.
//!
//! Samples through a fake decode surface into a real slot registry, and
//! checks the timestamp grid with property tests.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use stillreel_core::{FrameRate, ReelError, TrimWindow, VideoSource};
use stillreel_media::{sample_timestamps, FrameSampler};
use stillreel_timeline::{ConcatScript, SlotRegistry, TimelineEntry};

use crate::fakes::FakeSurface;

fn sampler(duration: f64) -> FrameSampler<FakeSurface> {
    FrameSampler::new(
        VideoSource::unchecked("trip.mp4"),
        FakeSurface::new(duration),
        90,
    )
}

// ── Timestamp grid ─────────────────────────────────────────────

#[test]
fn count_one_samples_window_start() {
    let window = TrimWindow::new(2.5, 8.0).unwrap();
    assert_eq!(sample_timestamps(1, window), vec![2.5]);
}

#[test]
fn five_samples_over_four_seconds() {
    let window = TrimWindow::new(0.0, 4.0).unwrap();
    assert_eq!(sample_timestamps(5, window), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
}

proptest! {
    #[test]
    fn timestamps_are_monotonic_and_bounded(
        start in 0.0f64..500.0,
        length in 0.0f64..500.0,
        count in 0usize..64,
    ) {
        let window = TrimWindow::new(start, start + length).unwrap();
        let ts = sample_timestamps(count, window);

        prop_assert_eq!(ts.len(), count);
        for t in &ts {
            prop_assert!(*t >= window.start && *t <= window.end);
        }
        for pair in ts.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        if count >= 2 {
            prop_assert_eq!(ts[0], window.start);
            prop_assert_eq!(ts[count - 1], window.end);
        }
    }

    #[test]
    fn default_window_stays_inside_video(duration in 0.0f64..3600.0) {
        let window = TrimWindow::full(duration);
        prop_assert_eq!(window.start, 0.0);
        prop_assert!(window.end <= duration);
        prop_assert!(window.end >= 0.0);
    }
}

// ── Sampling into slots ────────────────────────────────────────

#[test]
fn autofill_populates_every_slot_with_provenance() {
    let sampler = sampler(30.0);
    let mut registry = SlotRegistry::default();
    let window = sampler.window(None, None).unwrap();

    let filled = sampler.autofill(&mut registry, window).unwrap();

    assert_eq!(filled, 14);
    assert_eq!(registry.video_ref_count(sampler.video()), 14);
    let timestamps: Vec<f64> = registry.slots().iter().filter_map(|s| s.timestamp()).collect();
    assert_eq!(timestamps.first().copied(), Some(0.0));
    assert!((timestamps[13] - 29.9).abs() < 1e-9);
    assert!(registry
        .populated()
        .all(|s| s.asset().unwrap().data.starts_with(&[0xFF, 0xD8])));

    let timeline = [TimelineEntry::new(14, 3), TimelineEntry::new(1, 3)];
    let script = ConcatScript::build(&timeline, &registry, FrameRate::FPS_30);
    assert_eq!(script.entry_count(), 2);
}

#[test]
fn trim_window_limits_sampling() {
    let sampler = sampler(60.0);
    let window = sampler.window(Some(10.0), Some(20.0)).unwrap();
    let frames = sampler.sample(3, window).unwrap();
    let ts: Vec<f64> = frames.iter().map(|f| f.timestamp).collect();
    assert_eq!(ts, vec![10.0, 15.0, 20.0]);
}

#[test]
fn window_ending_at_duration_captures_final_frame() {
    let sampler = sampler(2.0);
    let window = sampler.window(Some(0.0), Some(5.0)).unwrap();
    assert_eq!(window.end, 2.0);

    let frames = sampler.sample(3, window).unwrap();

    let ts: Vec<f64> = frames.iter().map(|f| f.timestamp).collect();
    assert_eq!(ts, vec![0.0, 1.0, 2.0]);
    assert_eq!(frames[2].asset.name, "frame_3.jpg");
}

#[test]
fn decoding_past_final_frame_fails_batch() {
    let mut surface = FakeSurface::new(2.0);
    surface.hold_final_frame = false;
    let sampler = FrameSampler::new(VideoSource::unchecked("short.mp4"), surface, 90);

    let err = sampler
        .sample(3, TrimWindow::new(0.0, 2.0).unwrap())
        .unwrap_err();
    assert!(matches!(err, ReelError::SeekFailure(_)));
}

#[test]
fn repick_past_end_records_duration() {
    let sampler = sampler(2.0);
    let mut registry = SlotRegistry::default();
    sampler
        .autofill(&mut registry, sampler.window(None, Some(2.0)).unwrap())
        .unwrap();
    assert_eq!(registry.get(13).unwrap().timestamp(), Some(2.0));

    sampler
        .repick(&mut registry, 0, 30.0, FrameRate::FPS_30)
        .unwrap();
    assert_eq!(registry.get(0).unwrap().timestamp(), Some(2.0));
    assert_eq!(registry.get(0).unwrap().asset().unwrap().name, "frame_2000.jpg");
}

#[test]
fn failing_seek_fails_whole_batch() {
    let mut surface = FakeSurface::new(10.0);
    surface.fail_on_seek = Some(3);
    let sampler = FrameSampler::new(VideoSource::unchecked("broken.mp4"), surface, 90);
    let mut registry = SlotRegistry::default();

    let err = sampler
        .autofill(&mut registry, TrimWindow::full(10.0))
        .unwrap_err();

    assert!(matches!(err, ReelError::SeekFailure(_)));
    assert!(registry.is_empty());
}

#[test]
fn repick_moves_slot_to_new_timestamp() {
    let sampler = sampler(12.0);
    let mut registry = SlotRegistry::default();
    sampler
        .autofill(&mut registry, TrimWindow::full(12.0))
        .unwrap();
    let before = registry.get(5).unwrap().asset().unwrap().clone();

    sampler
        .repick(&mut registry, 5, 0.0, FrameRate::FPS_30)
        .unwrap();

    let slot = registry.get(5).unwrap();
    assert_eq!(slot.timestamp(), Some(0.0));
    assert_eq!(slot.asset().unwrap().name, "frame_0.jpg");
    assert_ne!(slot.asset().unwrap().data, before.data);
    assert!(Arc::ptr_eq(slot.source_video().unwrap(), sampler.video()));
}

#[test]
fn concurrent_batches_never_interleave() {
    let surface = FakeSurface::new(20.0);
    let overlaps = Arc::clone(&surface.overlaps);
    let cycles = Arc::clone(&surface.cycles);
    let sampler = Arc::new(FrameSampler::new(
        VideoSource::unchecked("shared.mp4"),
        surface,
        75,
    ));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let sampler = Arc::clone(&sampler);
            thread::spawn(move || {
                let window = TrimWindow::new(i as f64, 10.0 + i as f64).unwrap();
                sampler.sample(6, window).map(|frames| frames.len())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 6);
    }
    assert_eq!(cycles.load(Ordering::SeqCst), 24);
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
}
