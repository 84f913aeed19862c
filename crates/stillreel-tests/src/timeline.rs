//! Integration tests for timeline text, slots and concat scripts.
//!
//! Exercises stillreel-core assets flowing through stillreel-timeline.

use stillreel_core::{estimate_memory_mb, FrameRate, ImageAsset, VideoSource};
use stillreel_timeline::{
    count_timeline_frames, parse_timeline, ConcatLine, ConcatScript, SlotRegistry, TimelineEntry,
};

// ── Helpers ────────────────────────────────────────────────────

fn image(name: &str) -> ImageAsset {
    ImageAsset::new(name, name.as_bytes().to_vec())
}

fn filled(ids: &[u32]) -> SlotRegistry {
    let mut registry = SlotRegistry::default();
    for &id in ids {
        registry
            .assign(id as usize - 1, image(&format!("{id}.png")))
            .unwrap();
    }
    registry
}

// ── Parsing ────────────────────────────────────────────────────

#[test]
fn parses_entries_in_line_order() {
    assert_eq!(
        parse_timeline("4 1\n2 3"),
        vec![TimelineEntry::new(4, 1), TimelineEntry::new(2, 3)]
    );
}

#[test]
fn garbage_count_defaults_to_one() {
    assert_eq!(parse_timeline("5 abc"), vec![TimelineEntry::new(5, 1)]);
}

#[test]
fn zero_count_never_writes_zero_duration() {
    let registry = filled(&[1]);
    let timeline = parse_timeline("1 0\n1 -4");
    assert_eq!(
        timeline,
        vec![TimelineEntry::new(1, 1), TimelineEntry::new(1, 1)]
    );

    let text = ConcatScript::build(&timeline, &registry, FrameRate::new(10, 1)).to_text();
    assert!(!text.contains("duration 0\n"), "{text}");
    assert_eq!(text.matches("duration 0.1\n").count(), 2);
}

#[test]
fn blank_text_is_empty_timeline() {
    assert!(parse_timeline("").is_empty());
    assert!(parse_timeline("  \n\t\n").is_empty());
}

#[test]
fn single_token_lines_are_dropped() {
    let text = "1 30\n7\n2 15 trailing words\n";
    assert_eq!(
        parse_timeline(text),
        vec![TimelineEntry::new(1, 30), TimelineEntry::new(2, 15)]
    );
    assert_eq!(count_timeline_frames(text), 45);
}

// ── Script building ────────────────────────────────────────────

#[test]
fn parsed_timeline_renders_to_script_text() {
    let registry = filled(&[1, 2]);
    let timeline = parse_timeline("1 2\n2 3\n");
    let script = ConcatScript::build(&timeline, &registry, FrameRate::new(10, 1));

    assert_eq!(
        script.lines,
        vec![
            ConcatLine::Entry {
                asset_ref: "image_1.png".into(),
                duration_seconds: 0.2,
            },
            ConcatLine::Entry {
                asset_ref: "image_2.png".into(),
                duration_seconds: 0.3,
            },
            ConcatLine::TrailingRepeat {
                asset_ref: "image_2.png".into(),
            },
        ]
    );
}

#[test]
fn trailing_repeat_follows_last_contributing_entry() {
    let registry = filled(&[3]);
    let timeline = parse_timeline("3 30\n9 30\n");
    let script = ConcatScript::build(&timeline, &registry, FrameRate::FPS_30);

    assert_eq!(script.entry_count(), 1);
    assert_eq!(
        script.to_text(),
        "file image_3.png\nduration 1\nfile image_3.png\n"
    );
}

#[test]
fn unpopulated_timeline_builds_empty_script() {
    let registry = filled(&[]);
    let script = ConcatScript::build(&parse_timeline("1 5\n2 5"), &registry, FrameRate::FPS_30);
    assert!(script.is_empty());
}

#[test]
fn batch_upload_feeds_script_in_natural_order() {
    let mut registry = SlotRegistry::default();
    registry.batch_assign(vec![image("shot10.jpg"), image("shot2.jpg"), image("Shot1.jpg")], 0);

    assert_eq!(registry.asset_for_id(1).unwrap().name, "Shot1.jpg");
    assert_eq!(registry.asset_for_id(2).unwrap().name, "shot2.jpg");
    assert_eq!(registry.asset_for_id(3).unwrap().name, "shot10.jpg");

    let script = ConcatScript::build(&parse_timeline("3 1\n1 1"), &registry, FrameRate::FPS_30);
    let refs: Vec<&str> = script.lines.iter().map(ConcatLine::asset_ref).collect();
    assert_eq!(refs, vec!["image_3.png", "image_1.png", "image_1.png"]);
}

#[test]
fn clearing_registry_releases_shared_video() {
    let video = VideoSource::unchecked("holiday.mp4");
    let mut registry = SlotRegistry::default();
    for index in 0..registry.capacity() {
        registry
            .assign_from_video_frame(index, image("frame.jpg"), video.clone(), index as f64)
            .unwrap();
    }
    assert_eq!(std::sync::Arc::strong_count(&video), 15);

    registry.clear_all();
    assert_eq!(std::sync::Arc::strong_count(&video), 1);
    assert!(registry.slots().iter().all(|s| s.timestamp().is_none()));
}

// ── Estimation ─────────────────────────────────────────────────

#[test]
fn memory_estimate_for_full_hd_batch() {
    assert_eq!(estimate_memory_mb(1920, 1080, 100), 791);
}
