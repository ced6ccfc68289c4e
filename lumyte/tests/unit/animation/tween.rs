use super::*;
use crate::animation::descriptor::{AnimationDescriptor, Keyframe};

fn fade_descriptor() -> AnimationDescriptor {
    AnimationDescriptor::rect(0)
        .prop("fill", "#102030")
        .keyframe(Keyframe::new(0.0).set("alpha", 0.0).set("x", 10.0))
        .keyframe(Keyframe::new(2.0).set("alpha", 1.0))
        .keyframe(Keyframe::new(2.0).set("alpha", 0.5).set("x", 50.0))
}

fn attr_num(track: &TweenTrack, name: &str) -> f64 {
    track.attr(name).and_then(|v| v.as_num()).unwrap()
}

#[test]
fn initial_state_is_a_deep_copy_of_keyframe_zero() {
    let track = TweenTrack::compile(fade_descriptor(), 0.0).unwrap();
    assert_eq!(attr_num(&track, "alpha"), 0.0);
    assert_eq!(attr_num(&track, "x"), 10.0);
    assert_eq!(track.initial_state().len(), 2);
}

#[test]
fn seek_interpolates_within_segments() {
    let mut track = TweenTrack::compile(fade_descriptor(), 0.0).unwrap();

    track.seek(1.0);
    assert!(track.is_active());
    assert!((attr_num(&track, "alpha") - 0.5).abs() < 1e-9);
    // Untouched by the first segment: holds its entry value.
    assert_eq!(attr_num(&track, "x"), 10.0);

    track.seek(3.0);
    assert!((attr_num(&track, "alpha") - 0.75).abs() < 1e-9);
    assert!((attr_num(&track, "x") - 30.0).abs() < 1e-9);
}

#[test]
fn activity_spans_the_track_inclusively() {
    let mut track = TweenTrack::compile(fade_descriptor(), 1.0).unwrap();

    track.seek(0.5);
    assert!(!track.is_active());

    track.seek(1.0);
    assert!(track.is_active(), "active at the start edge");

    track.seek(5.0);
    assert!(track.is_active(), "active at the end edge");
    assert!((attr_num(&track, "alpha") - 0.5).abs() < 1e-9);

    track.seek(5.1);
    assert!(!track.is_active(), "inactive strictly past the end");
}

#[test]
fn seeking_backwards_restores_pristine_state() {
    let mut track = TweenTrack::compile(fade_descriptor(), 0.0).unwrap();
    let pristine = track.initial_state().clone();

    track.seek(3.7);
    track.seek(-0.1);
    assert!(!track.is_active());
    assert_eq!(attr_num(&track, "alpha"), 0.0);
    assert_eq!(attr_num(&track, "x"), 10.0);
    assert_eq!(track.initial_state(), &pristine);
}

#[test]
fn recompiling_the_same_descriptor_is_unaffected_by_prior_seeks() {
    let descriptor = fade_descriptor();
    let mut used = TweenTrack::compile(descriptor.clone(), 0.0).unwrap();
    used.seek(2.5);

    let fresh = TweenTrack::compile(descriptor, 0.0).unwrap();
    assert_eq!(fresh.initial_state(), used.initial_state());
    assert_eq!(attr_num(&fresh, "alpha"), 0.0);
}

#[test]
fn text_values_snap_at_segment_entry() {
    let descriptor = AnimationDescriptor::text(0)
        .keyframe(Keyframe::new(0.0).set("text", "one"))
        .keyframe(Keyframe::new(1.0).set("text", "two"));
    let mut track = TweenTrack::compile(descriptor, 0.0).unwrap();

    track.seek(0.0);
    assert_eq!(track.attr("text").and_then(|v| v.as_text()), Some("one"));
    track.seek(0.2);
    assert_eq!(track.attr("text").and_then(|v| v.as_text()), Some("two"));
}

#[test]
fn props_resolve_behind_tween_state() {
    let track = TweenTrack::compile(fade_descriptor(), 0.0).unwrap();
    assert_eq!(track.attr("fill").and_then(|v| v.as_text()), Some("#102030"));
    assert!(track.attr("missing").is_none());
}

#[test]
fn zero_duration_track_is_active_only_at_its_instant() {
    let descriptor = AnimationDescriptor::rect(0).keyframe(Keyframe::new(0.0).set("alpha", 1.0));
    let mut track = TweenTrack::compile(descriptor, 2.0).unwrap();

    track.seek(2.0);
    assert!(track.is_active());
    track.seek(2.01);
    assert!(!track.is_active());
}

#[test]
fn attributes_introduced_later_do_not_exist_early() {
    let descriptor = AnimationDescriptor::rect(0)
        .keyframe(Keyframe::new(0.0).set("alpha", 0.0))
        .keyframe(Keyframe::new(1.0).set("alpha", 1.0))
        .keyframe(Keyframe::new(1.0).set("glow", 4.0));
    let mut track = TweenTrack::compile(descriptor, 0.0).unwrap();

    track.seek(0.5);
    assert!(track.attr("glow").is_none());
    track.seek(1.5);
    assert_eq!(attr_num(&track, "glow"), 4.0);
    track.seek(0.5);
    assert!(track.attr("glow").is_none(), "seeking back drops it again");
}
