//! Animation System Tests
//!
//! Tests for:
//! - KeyframeTrack linear/step/cubic interpolation and cursor reuse
//! - Tracks whose value count does not match their keyframe times
//! - AnimationAction loop modes and play/stop scheduling
//! - AnimationClip duration and lookup by name
//! - AnimationMixer binding by node name and writing transforms

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Quat, Vec3};

use avatar_stage::animation::{
    AnimationAction, AnimationClip, AnimationMixer, InterpolationMode, KeyframeCursor, KeyframeTrack, LoopMode,
    PropertyBinding, TargetPath, Track, TrackData, TrackMeta, TrackValue,
};
use avatar_stage::errors::StageError;
use avatar_stage::scene::{Scene, Transform};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn translation_track(node: &str, times: Vec<f32>, values: Vec<Vec3>, mode: InterpolationMode) -> Track {
    Track::translation(node, KeyframeTrack::new(times, values, mode))
}

fn rotation_track(node: &str, times: Vec<f32>, values: Vec<Quat>) -> Track {
    Track::rotation(node, KeyframeTrack::new(times, values, InterpolationMode::Linear))
}

// ============================================================================
// KeyframeTrack: Interpolation
// ============================================================================

#[test]
fn track_linear_f32_midpoint() {
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32, 10.0], InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    let val = track.sample_with_cursor(0.5, &mut cursor).unwrap();
    assert!(approx(val, 5.0), "Expected 5.0, got {val}");
}

#[test]
fn track_linear_clamps_outside_range() {
    let track = KeyframeTrack::new(vec![1.0, 2.0], vec![10.0_f32, 20.0], InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(0.0, &mut cursor).unwrap(), 10.0));
    assert!(approx(track.sample_with_cursor(5.0, &mut cursor).unwrap(), 20.0));
}

#[test]
fn track_step_holds_previous_value() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0],
        vec![0.0_f32, 10.0, 20.0],
        InterpolationMode::Step,
    );

    assert!(approx(track.sample(0.99).unwrap(), 0.0));
    assert!(approx(track.sample(1.0).unwrap(), 10.0));
    assert!(approx(track.sample(1.5).unwrap(), 10.0));
}

#[test]
fn track_cubic_hits_keyframe_values() {
    // (in-tangent, value, out-tangent) per keyframe
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![0.0_f32, 1.0, 0.0, 0.0, 3.0, 0.0],
        InterpolationMode::CubicSpline,
    );

    assert!(approx(track.sample(0.0).unwrap(), 1.0));
    assert!(approx(track.sample(1.0).unwrap(), 3.0));
    // Zero tangents: smoothstep between the two values
    assert!(approx(track.sample(0.5).unwrap(), 2.0));
}

#[test]
fn track_empty_samples_none() {
    let track: KeyframeTrack<f32> = KeyframeTrack::new(vec![], vec![], InterpolationMode::Linear);
    let mut cursor = KeyframeCursor::default();
    assert!(track.sample(0.0).is_none());
    assert!(track.sample_with_cursor(0.0, &mut cursor).is_none());
}

#[test]
fn track_short_values_sample_none() {
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![1.0_f32], InterpolationMode::Linear);
    let mut cursor = KeyframeCursor::default();

    assert!(!track.is_consistent());
    // The first keyframe still has its value; anything needing the second does not
    assert!(track.sample(0.5).is_none());
    assert!(track.sample_with_cursor(0.5, &mut cursor).is_none());
    assert!(track.sample(2.0).is_none());
}

#[test]
fn track_short_cubic_values_sample_none() {
    // One tangent triple for two keyframes
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32, 1.0, 0.0], InterpolationMode::CubicSpline);
    let mut cursor = KeyframeCursor::default();

    assert_eq!(track.expected_value_count(), 6);
    assert!(!track.is_consistent());
    assert!(track.sample(0.5).is_none());
    assert!(track.sample_with_cursor(1.0, &mut cursor).is_none());
}

#[test]
fn track_consistency_counts_tangents() {
    let linear = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32, 1.0], InterpolationMode::Linear);
    let cubic = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32; 6], InterpolationMode::CubicSpline);
    assert!(linear.is_consistent());
    assert!(cubic.is_consistent());
    assert!(!TrackData::Vector3(KeyframeTrack::new(vec![0.0], vec![], InterpolationMode::Step)).is_consistent());
}

#[test]
fn track_cursor_matches_stateless_sampling() {
    let times: Vec<f32> = (0..20).map(|i| i as f32 * 0.1).collect();
    let values: Vec<f32> = (0..20).map(|i| (i * i) as f32).collect();
    let track = KeyframeTrack::new(times, values, InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    // Forward, then a wrap back to the start, then a far jump
    for &t in &[0.05, 0.15, 0.42, 0.77, 1.85, 0.02, 1.3] {
        let with_cursor = track.sample_with_cursor(t, &mut cursor).unwrap();
        let stateless = track.sample(t).unwrap();
        assert!(approx(with_cursor, stateless), "t={t}: {with_cursor} vs {stateless}");
    }
}

#[test]
fn track_quat_linear_is_slerp() {
    let end = Quat::from_rotation_z(FRAC_PI_2);
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![Quat::IDENTITY, end], InterpolationMode::Linear);

    let mid = track.sample(0.5).unwrap();
    let expected = Quat::from_rotation_z(FRAC_PI_2 / 2.0);
    assert!(mid.angle_between(expected) < 1e-4);
}

// ============================================================================
// AnimationClip
// ============================================================================

#[test]
fn clip_duration_is_latest_keyframe() {
    let clip = AnimationClip::new(
        "waving",
        vec![
            translation_track("Hips", vec![0.0, 1.5], vec![Vec3::ZERO, Vec3::Y], InterpolationMode::Linear),
            rotation_track("Arm", vec![0.0, 2.25], vec![Quat::IDENTITY, Quat::IDENTITY]),
        ],
    );
    assert!(approx(clip.duration, 2.25));
}

#[test]
fn clip_find_by_name() {
    let clips = vec![
        Arc::new(AnimationClip::new("waving", vec![])),
        Arc::new(AnimationClip::new("salut", vec![])),
    ];

    let found = AnimationClip::find_by_name(&clips, "salut").unwrap();
    assert_eq!(found.name, "salut");
}

#[test]
fn clip_find_by_name_missing_is_clip_not_found() {
    let clips = vec![Arc::new(AnimationClip::new("waving", vec![]))];

    match AnimationClip::find_by_name(&clips, "Waving") {
        Err(StageError::ClipNotFound { name }) => assert_eq!(name, "Waving"),
        other => panic!("Expected ClipNotFound, got {other:?}"),
    }
}

// ============================================================================
// AnimationAction
// ============================================================================

fn one_second_clip() -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        "clip",
        vec![translation_track(
            "Hips",
            vec![0.0, 1.0],
            vec![Vec3::ZERO, Vec3::X],
            InterpolationMode::Linear,
        )],
    ))
}

#[test]
fn action_is_stopped_until_played() {
    let mut action = AnimationAction::new(one_second_clip());
    assert!(!action.is_running());

    action.update(0.5);
    assert!(approx(action.time, 0.0));

    action.play();
    assert!(action.is_running());
    action.update(0.5);
    assert!(approx(action.time, 0.5));
}

#[test]
fn action_loop_wraps() {
    let mut action = AnimationAction::new(one_second_clip());
    action.play();
    action.update(1.25);
    assert!(approx(action.time, 0.25), "Got {}", action.time);
}

#[test]
fn action_once_holds_last_frame() {
    let mut action = AnimationAction::new(one_second_clip());
    action.loop_mode = LoopMode::Once;
    action.play();
    action.update(3.0);
    assert!(approx(action.time, 1.0));
    assert!(action.paused);
    assert!(!action.is_running());
}

#[test]
fn action_ping_pong_reflects() {
    let mut action = AnimationAction::new(one_second_clip());
    action.loop_mode = LoopMode::PingPong;
    action.play();
    action.update(1.25);
    assert!(approx(action.time, 0.75), "Got {}", action.time);
}

#[test]
fn action_stop_rewinds() {
    let mut action = AnimationAction::new(one_second_clip());
    action.play();
    action.update(0.4);
    action.stop();
    assert!(approx(action.time, 0.0));
    assert!(!action.is_scheduled());
}

#[test]
fn loop_mode_wrap_flags_only_finished_once() {
    assert_eq!(LoopMode::Once.wrap(0.5, 1.0), (0.5, false));
    assert_eq!(LoopMode::Once.wrap(1.5, 1.0), (1.0, true));
    assert_eq!(LoopMode::Once.wrap(-0.5, 1.0), (0.0, true));
    assert_eq!(LoopMode::Loop.wrap(-0.25, 1.0), (0.75, false));
    assert_eq!(LoopMode::PingPong.wrap(1.5, 1.0), (0.5, false));
}

// ============================================================================
// Tracks & bindings
// ============================================================================

#[test]
fn track_constructors_set_target_channel() {
    let keys = || KeyframeTrack::new(vec![0.0], vec![Vec3::ONE], InterpolationMode::Step);

    let scale = Track::scale("Hips", keys());
    assert_eq!(scale.meta.node_name, "Hips");
    assert_eq!(scale.meta.target, TargetPath::Scale);
    assert!(matches!(scale.data, TrackData::Vector3(_)));

    let TrackMeta { target, .. } = Track::translation("Hips", keys()).meta;
    assert_eq!(target, TargetPath::Translation);
}

#[test]
fn binding_ignores_mismatched_value_kind() {
    let binding = PropertyBinding {
        track_index: 0,
        node_handle: avatar_stage::NodeHandle::default(),
        target: TargetPath::Rotation,
    };
    let mut transform = Transform::new();

    assert!(!binding.apply(TrackValue::Vector3(Vec3::X), 1.0, &mut transform));
    assert_eq!(transform.rotation, Quat::IDENTITY);

    let quarter_turn = Quat::from_rotation_y(FRAC_PI_2);
    assert!(binding.apply(TrackValue::Quaternion(quarter_turn), 0.5, &mut transform));
    assert!(transform.rotation.angle_between(Quat::from_rotation_y(FRAC_PI_2 / 2.0)) < 1e-4);
}

// ============================================================================
// AnimationMixer
// ============================================================================

fn rig() -> (Scene, avatar_stage::NodeHandle, avatar_stage::NodeHandle) {
    let mut scene = Scene::new();
    let root = scene.add_named_node("Avatar", Transform::new());
    let hips = scene.add_named_node("Hips", Transform::new());
    scene.attach(hips, root);
    (scene, root, hips)
}

#[test]
fn mixer_clip_action_is_created_stopped_and_reused() {
    let (scene, root, _) = rig();
    let clip = one_second_clip();
    let mut mixer = AnimationMixer::new(root);

    let a = mixer.clip_action(&clip, &scene);
    let b = mixer.clip_action(&clip, &scene);
    assert_eq!(a, b);
    assert!(!mixer.action(a).unwrap().is_scheduled());
    assert_eq!(mixer.action(a).unwrap().bindings.len(), 1);
}

#[test]
fn mixer_skips_tracks_for_unknown_nodes() {
    let (scene, root, _) = rig();
    let clip = Arc::new(AnimationClip::new(
        "clip",
        vec![
            translation_track("Hips", vec![0.0, 1.0], vec![Vec3::ZERO, Vec3::X], InterpolationMode::Linear),
            translation_track("Tail", vec![0.0, 1.0], vec![Vec3::ZERO, Vec3::X], InterpolationMode::Linear),
        ],
    ));
    let mut mixer = AnimationMixer::new(root);

    let handle = mixer.clip_action(&clip, &scene);
    let bindings = &mixer.action(handle).unwrap().bindings;
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].track_index, 0);
}

#[test]
fn mixer_update_writes_playing_action_only() {
    let (mut scene, root, hips) = rig();
    let playing = one_second_clip();
    let idle = Arc::new(AnimationClip::new(
        "idle",
        vec![translation_track(
            "Hips",
            vec![0.0, 1.0],
            vec![Vec3::Y * 5.0, Vec3::Y * 5.0],
            InterpolationMode::Linear,
        )],
    ));

    let mut mixer = AnimationMixer::new(root);
    let handle = mixer.clip_action(&playing, &scene);
    mixer.clip_action(&idle, &scene);
    mixer.action_mut(handle).unwrap().play();

    mixer.update(0.5, &mut scene);

    let position = scene.get_node(hips).unwrap().transform.position;
    assert!(approx(position.x, 0.5), "Got {position}");
    assert!(approx(position.y, 0.0), "Stopped action must not write: {position}");
    assert_eq!(mixer.running_actions().count(), 1);
}

#[test]
fn mixer_rotation_track_rotates_node() {
    let (mut scene, root, hips) = rig();
    let clip = Arc::new(AnimationClip::new(
        "waving",
        vec![rotation_track(
            "Hips",
            vec![0.0, 1.0],
            vec![Quat::IDENTITY, Quat::from_rotation_z(FRAC_PI_2)],
        )],
    ));

    let mut mixer = AnimationMixer::new(root);
    let handle = mixer.clip_action(&clip, &scene);
    mixer.action_mut(handle).unwrap().play();
    mixer.update(1.0 - 1e-3, &mut scene);

    let rotation = scene.get_node(hips).unwrap().transform.rotation;
    assert!(rotation.angle_between(Quat::from_rotation_z(FRAC_PI_2)) < 1e-2);
}

#[test]
fn mixer_short_track_leaves_node_untouched() {
    let (mut scene, root, hips) = rig();
    let before = scene.get_node(hips).unwrap().transform.position;
    let clip = Arc::new(AnimationClip::new(
        "waving",
        vec![translation_track("Hips", vec![0.0, 1.0], vec![Vec3::X], InterpolationMode::Linear)],
    ));

    let mut mixer = AnimationMixer::new(root);
    let handle = mixer.clip_action(&clip, &scene);
    mixer.action_mut(handle).unwrap().play();
    mixer.update(0.5, &mut scene);

    assert_eq!(scene.get_node(hips).unwrap().transform.position, before);
}
