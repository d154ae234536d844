//! Scene Tests
//!
//! - Stage scene setup (background, lights, grid, camera)
//! - Hierarchy world matrices
//! - Skeleton joint palettes

use glam::{Affine3A, Quat, Vec3};

use motion_stage::config::SceneConfig;
use motion_stage::renderer::Viewport;
use motion_stage::scene::{Node, Scene, Skeleton};
use motion_stage::stage::setup_scene;

const EPSILON: f32 = 1e-4;

#[test]
fn default_stage_setup() {
    let (scene, camera) = setup_scene(&SceneConfig::default(), Viewport::new(1280.0, 720.0, 1.0));

    assert_eq!(scene.background.to_hex(), 0x000f1e);
    assert_eq!(scene.ambient.color.to_hex(), 0x666666);
    assert_eq!(scene.directional.color.to_hex(), 0x666666);
    let expected = Vec3::new(-1.0, 1.0, 1.0).normalize();
    assert!(scene.directional.position.normalize().abs_diff_eq(expected, EPSILON));

    let grid = scene.grid.as_ref().unwrap();
    assert!((grid.size - 50.0).abs() < EPSILON);
    assert_eq!(grid.divisions, 15);
    assert_eq!(grid.line_color.to_hex(), 0x00aeeb);
    assert!((grid.position.y + 10.0).abs() < EPSILON);

    assert!((camera.fov_degrees() - 45.0).abs() < EPSILON);
    assert!((camera.near - 1.0).abs() < EPSILON);
    assert!((camera.far - 2000.0).abs() < EPSILON);
    assert!((camera.aspect - 1280.0 / 720.0).abs() < EPSILON);
    assert!(camera.transform.position.abs_diff_eq(Vec3::new(0.0, 0.0, 30.0), EPSILON));
}

#[test]
fn zero_height_viewport_falls_back_to_square_aspect() {
    let (_, camera) = setup_scene(&SceneConfig::default(), Viewport::new(800.0, 0.0, 1.0));
    assert!((camera.aspect - 1.0).abs() < EPSILON);
}

#[test]
fn world_matrices_follow_hierarchy() {
    let mut scene = Scene::new();
    let mut root = Node::new("root");
    root.transform.position = Vec3::new(0.0, -10.0, 0.0);
    let root = scene.add_node(root);

    let mut arm = Node::new("arm");
    arm.transform.position = Vec3::new(1.0, 0.0, 0.0);
    arm.transform.rotation = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
    let arm = scene.add_to_parent(arm, root);

    let mut hand = Node::new("hand");
    hand.transform.position = Vec3::new(2.0, 0.0, 0.0);
    let hand = scene.add_to_parent(hand, arm);

    scene.update_matrix_world();

    let world = scene.get_node(hand).unwrap().transform.world_position();
    assert!(world.abs_diff_eq(Vec3::new(1.0, -8.0, 0.0), EPSILON), "{world:?}");
    assert_eq!(scene.find_node_by_name(root, "hand"), Some(hand));
    assert_eq!(scene.subtree(root).len(), 3);
}

#[test]
fn joint_palette_is_identity_in_bind_pose() {
    let mut scene = Scene::new();
    let mut hip = Node::new("hip");
    hip.transform.position = Vec3::new(0.0, 3.0, 0.0);
    let hip = scene.add_node(hip);
    scene.update_matrix_world();

    let inverse_bind = Affine3A::from_translation(Vec3::new(0.0, -3.0, 0.0));
    let key = scene.add_skeleton(Skeleton::new("body", vec![hip], vec![inverse_bind]));
    scene.update_skeletons();

    let skeleton = &scene.skeletons[key];
    assert_eq!(skeleton.joint_count(), 1);
    assert!(skeleton.joint_matrices()[0].abs_diff_eq(glam::Mat4::IDENTITY, EPSILON));
}
