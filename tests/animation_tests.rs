//! Animation Tests
//!
//! - KeyframeTrack interpolation and clamping
//! - AnimationClip duration and merging
//! - AnimationAction loop modes
//! - AnimationMixer binding, stop-all and rest pose restore

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Quat, Vec3};

use motion_stage::animation::{
    AnimationAction, AnimationClip, AnimationMixer, InterpolationMode, KeyframeCursor,
    KeyframeTrack, LoopMode, TargetPath, Track, TrackData, TrackMeta,
};
use motion_stage::scene::{Node, NodeHandle, Scene};

const EPSILON: f32 = 1e-4;

fn rotation_clip(name: &str, bone: &str, duration: f32, angle: f32) -> AnimationClip {
    let track = KeyframeTrack::new(
        vec![0.0, duration],
        vec![Quat::IDENTITY, Quat::from_rotation_y(angle)],
        InterpolationMode::Linear,
    );
    AnimationClip::new(
        name,
        vec![Track {
            meta: TrackMeta {
                node_name: bone.to_string(),
                target: TargetPath::Rotation,
            },
            data: TrackData::Quaternion(track),
        }],
    )
}

fn rigged_scene() -> (Scene, NodeHandle, NodeHandle) {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("model"));
    let bone = scene.add_to_parent(Node::new("arm"), root);
    scene.update_matrix_world();
    (scene, root, bone)
}

// ============================================================================
// KeyframeTrack
// ============================================================================

#[test]
fn track_linear_vec3_midpoint() {
    let track = KeyframeTrack::new(
        vec![0.0, 2.0],
        vec![Vec3::ZERO, Vec3::new(4.0, 0.0, -2.0)],
        InterpolationMode::Linear,
    );
    let value = track.sample(1.0).unwrap();
    assert!(value.abs_diff_eq(Vec3::new(2.0, 0.0, -1.0), EPSILON));
}

#[test]
fn track_step_holds_previous_key() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0],
        vec![Vec3::X, Vec3::Y, Vec3::Z],
        InterpolationMode::Step,
    );
    assert_eq!(track.sample(0.99), Some(Vec3::X));
    assert_eq!(track.sample(1.5), Some(Vec3::Y));
}

#[test]
fn track_clamps_outside_range() {
    let track = KeyframeTrack::new(
        vec![1.0, 2.0],
        vec![Vec3::ONE, Vec3::splat(3.0)],
        InterpolationMode::Linear,
    );
    assert_eq!(track.sample(-5.0), Some(Vec3::ONE));
    assert_eq!(track.sample(10.0), Some(Vec3::splat(3.0)));
}

#[test]
fn empty_track_samples_nothing() {
    let track: KeyframeTrack<Vec3> = KeyframeTrack::new(vec![], vec![], InterpolationMode::Linear);
    assert!(track.is_empty());
    assert_eq!(track.sample(0.0), None);
}

#[test]
fn cursor_matches_stateless_sampling() {
    let times: Vec<f32> = (0..10).map(|i| i as f32).collect();
    let values: Vec<Vec3> = times.iter().map(|&t| Vec3::new(t * t, 0.0, 0.0)).collect();
    let track = KeyframeTrack::new(times, values, InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    // Forward, then a jump backwards that forces the fallback search.
    for t in [0.25, 1.5, 2.75, 3.1, 8.9, 0.5, 6.6] {
        let expected = track.sample(t).unwrap();
        let actual = track.sample_with_cursor(t, &mut cursor).unwrap();
        assert!(actual.abs_diff_eq(expected, EPSILON), "t = {t}");
    }
}

#[test]
fn quaternion_track_slerps() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Quat::IDENTITY, Quat::from_rotation_z(FRAC_PI_2)],
        InterpolationMode::Linear,
    );
    let half = track.sample(0.5).unwrap();
    assert!(half.abs_diff_eq(Quat::from_rotation_z(FRAC_PI_2 / 2.0), EPSILON));
}

// ============================================================================
// AnimationClip
// ============================================================================

#[test]
fn clip_duration_is_longest_track() {
    let mut a = rotation_clip("a", "arm", 1.5, 1.0);
    let b = rotation_clip("b", "leg", 4.0, 1.0);
    a.tracks.extend(b.tracks);
    let merged = AnimationClip::new("ab", a.tracks);
    assert!((merged.duration - 4.0).abs() < EPSILON);
    assert_eq!(merged.track_count(), 2);
}

#[test]
fn merge_concatenates_tracks() {
    let merged = AnimationClip::merge(
        "loop_step_1",
        [rotation_clip("x", "arm", 1.0, 1.0), rotation_clip("y", "leg", 2.0, 1.0)],
    );
    assert_eq!(merged.name, "loop_step_1");
    assert_eq!(merged.track_count(), 2);
    assert!((merged.duration - 2.0).abs() < EPSILON);
}

#[test]
fn track_with_mismatched_values_samples_nothing() {
    let track = KeyframeTrack::new(
        vec![0.0, 0.5, 1.0],
        vec![Vec3::ZERO, Vec3::X],
        InterpolationMode::Linear,
    );
    assert!(!track.is_valid());
    assert!(track.is_empty());
    assert_eq!(track.sample(0.75), None);
    let mut cursor = KeyframeCursor::default();
    assert_eq!(track.sample_with_cursor(1.0, &mut cursor), None);

    // Cubic splines carry three values per key.
    let cubic = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, Vec3::X, Vec3::ZERO],
        InterpolationMode::CubicSpline,
    );
    assert_eq!(cubic.expected_value_count(), 6);
    assert!(cubic.is_valid());
    assert!(cubic.sample(1.0).unwrap().abs_diff_eq(Vec3::X, EPSILON));

    let cubic_short = KeyframeTrack::new(vec![0.0, 1.0], vec![Vec3::ZERO, Vec3::X], InterpolationMode::CubicSpline);
    assert_eq!(cubic_short.sample(0.5), None);
}

// ============================================================================
// AnimationAction
// ============================================================================

#[test]
fn action_loop_wraps_time() {
    let clip = Arc::new(rotation_clip("c", "arm", 2.0, 1.0));
    let mut action = AnimationAction::new(clip, Vec::new());
    action.play();
    action.advance(2.5);
    assert!((action.time - 0.5).abs() < EPSILON);
    assert!(action.is_playing());
}

#[test]
fn action_once_finishes_at_end() {
    let clip = Arc::new(rotation_clip("c", "arm", 1.0, 1.0));
    let mut action = AnimationAction::new(clip, Vec::new());
    action.loop_mode = LoopMode::Once;
    action.play();
    action.advance(3.0);
    assert!(action.is_finished());
    assert!(!action.is_playing());
    assert!((action.time - 1.0).abs() < EPSILON);

    action.play();
    assert_eq!(action.time, 0.0);
    assert!(action.is_playing());
}

#[test]
fn action_ping_pong_reflects() {
    let clip = Arc::new(rotation_clip("c", "arm", 1.0, 1.0));
    let mut action = AnimationAction::new(clip, Vec::new());
    action.loop_mode = LoopMode::PingPong;
    action.play();
    action.advance(1.25);
    assert!((action.time - 0.75).abs() < EPSILON);

    // Keeps running backward after the bounce, then turns at zero.
    action.advance(0.1);
    assert!((action.time - 0.65).abs() < EPSILON);
    action.advance(0.75);
    assert!((action.time - 0.1).abs() < EPSILON);
    action.advance(0.2);
    assert!((action.time - 0.3).abs() < EPSILON);

    action.stop();
    action.play();
    action.advance(0.4);
    assert!((action.time - 0.4).abs() < EPSILON);
}

#[test]
fn stopped_action_does_not_advance() {
    let clip = Arc::new(rotation_clip("c", "arm", 1.0, 1.0));
    let mut action = AnimationAction::new(clip, Vec::new());
    action.advance(0.5);
    assert_eq!(action.time, 0.0);
}

// ============================================================================
// AnimationMixer
// ============================================================================

#[test]
fn mixer_binds_by_node_name_and_applies_rotation() {
    let (mut scene, root, bone) = rigged_scene();
    let clip = Arc::new(rotation_clip("turn", "arm", 1.0, FRAC_PI_2));

    let mut mixer = AnimationMixer::new(root);
    let handle = mixer.clip_action(&clip, &scene);
    assert_eq!(mixer.action(handle).unwrap().bindings().len(), 1);

    mixer.play(handle);
    mixer.update(1.0 - 1e-3, &mut scene);

    let rotation = scene.get_node(bone).unwrap().transform.rotation;
    assert!(rotation.abs_diff_eq(Quat::from_rotation_y(FRAC_PI_2), 1e-2));
}

#[test]
fn clip_action_is_cached_per_clip() {
    let (scene, root, _) = rigged_scene();
    let clip = Arc::new(rotation_clip("turn", "arm", 1.0, 1.0));
    let other = Arc::new(rotation_clip("turn", "arm", 1.0, 1.0));

    let mut mixer = AnimationMixer::new(root);
    let a = mixer.clip_action(&clip, &scene);
    let b = mixer.clip_action(&clip, &scene);
    let c = mixer.clip_action(&other, &scene);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(mixer.actions().len(), 2);
}

#[test]
fn unknown_bones_are_skipped() {
    let (scene, root, _) = rigged_scene();
    let clip = Arc::new(rotation_clip("tail", "tail_bone", 1.0, 1.0));
    let mut mixer = AnimationMixer::new(root);
    let handle = mixer.clip_action(&clip, &scene);
    assert!(mixer.action(handle).unwrap().bindings().is_empty());
}

#[test]
fn stop_all_then_play_leaves_one_running() {
    let (mut scene, root, bone) = rigged_scene();
    let first = Arc::new(rotation_clip("a", "arm", 1.0, 1.0));
    let second = Arc::new(rotation_clip("b", "arm", 1.0, -1.0));

    let mut mixer = AnimationMixer::new(root);
    let a = mixer.clip_action(&first, &scene);
    let b = mixer.clip_action(&second, &scene);
    mixer.play(a);
    mixer.play(b);
    assert_eq!(mixer.running_count(), 2);

    mixer.update(0.5, &mut scene);
    assert_ne!(scene.get_node(bone).unwrap().transform.rotation, Quat::IDENTITY);

    mixer.stop_all_action(&mut scene);
    assert_eq!(mixer.running_count(), 0);
    assert!(!mixer.is_playing());
    assert_eq!(scene.get_node(bone).unwrap().transform.rotation, Quat::IDENTITY);

    mixer.play(b);
    assert_eq!(mixer.running_count(), 1);
    assert!(mixer.action(b).unwrap().is_playing());
}
