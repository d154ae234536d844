//! Secondary motion tests (rapier3d)

use glam::Vec3;

use motion_stage::physics::{PhysicsBinding, PhysicsConfig};
use motion_stage::scene::{Node, NodeHandle, Scene};

/// root -> hair_1 (origin) -> tip (+X): a horizontal strand.
fn strand() -> (Scene, NodeHandle, NodeHandle) {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("model"));
    let hair = scene.add_to_parent(Node::new("hair_1"), root);
    let mut tip = Node::new("tip");
    tip.transform.position = Vec3::X;
    scene.add_to_parent(tip, hair);
    scene.update_matrix_world();
    (scene, root, hair)
}

#[test]
fn bone_patterns_match_case_insensitively() {
    let config = PhysicsConfig::default();
    assert!(config.matches("Hair_L"));
    assert!(config.matches("SKIRT_02"));
    assert!(config.matches("前髪1"));
    assert!(!config.matches("LeftArm"));
}

#[test]
fn only_matching_bones_become_dynamic() {
    let (scene, root, _) = strand();
    let binding = PhysicsBinding::new(&scene, root, &PhysicsConfig::default());
    assert_eq!(binding.dynamic_bone_count(), 1);

    let config = PhysicsConfig {
        bone_patterns: vec!["cape".to_string()],
        ..PhysicsConfig::default()
    };
    let binding = PhysicsBinding::new(&scene, root, &config);
    assert_eq!(binding.dynamic_bone_count(), 0);
}

#[test]
fn strand_falls_under_gravity() {
    let (mut scene, root, hair) = strand();
    let mut binding = PhysicsBinding::new(&scene, root, &PhysicsConfig::default());

    for _ in 0..120 {
        binding.update(1.0 / 60.0, &mut scene);
        scene.update_matrix_world();
    }

    let rotation = scene.get_node(hair).unwrap().transform.rotation;
    let direction = rotation * Vec3::X;
    assert!(direction.y < -0.3, "strand direction {direction:?}");
}

#[test]
fn reset_snaps_back_to_pose() {
    let (mut scene, root, hair) = strand();
    let config = PhysicsConfig {
        warmup_steps: 0,
        ..PhysicsConfig::default()
    };
    let mut binding = PhysicsBinding::new(&scene, root, &config);
    for _ in 0..30 {
        binding.update(1.0 / 60.0, &mut scene);
    }

    // Restore the authored pose, then re-seat the bodies on it.
    scene.get_node_mut(hair).unwrap().transform.rotation = glam::Quat::IDENTITY;
    scene.update_matrix_world();
    binding.reset(&scene);
    binding.update(0.0, &mut scene);

    let direction = scene.get_node(hair).unwrap().transform.rotation * Vec3::X;
    assert!(direction.abs_diff_eq(Vec3::X, 1e-3), "{direction:?}");
}
