use glam::{Quat, Vec3};
use rapier3d::prelude::*;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::physics::world::{
    PhysicsWorld, from_rotation, from_translation, to_isometry, to_point,
};
use crate::scene::{NodeHandle, Scene};

/// Tuning for secondary-motion bodies.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: [f32; 3],
    /// Fixed simulation step in seconds.
    pub timestep: f32,
    /// Upper bound of fixed steps per frame; excess time is dropped.
    pub max_substeps: u32,
    /// Case-insensitive substrings selecting bones that swing freely.
    pub bone_patterns: Vec<String>,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub density: f32,
    /// Collider radius as a fraction of bone length.
    pub radius_scale: f32,
    pub min_radius: f32,
    /// Steps run at registration so chains start settled.
    pub warmup_steps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -98.0, 0.0],
            timestep: 1.0 / 65.0,
            max_substeps: 3,
            bone_patterns: ["hair", "skirt", "ribbon", "tail", "髪", "スカート", "リボン"]
                .into_iter()
                .map(String::from)
                .collect(),
            linear_damping: 0.9,
            angular_damping: 0.9,
            density: 1.0,
            radius_scale: 0.25,
            min_radius: 0.05,
            warmup_steps: 60,
        }
    }
}

impl PhysicsConfig {
    #[must_use]
    pub fn matches(&self, bone_name: &str) -> bool {
        let lower = bone_name.to_lowercase();
        self.bone_patterns
            .iter()
            .any(|p| lower.contains(&p.to_lowercase()))
    }
}

#[derive(Debug, Clone, Copy)]
struct DynamicBone {
    node: NodeHandle,
    parent: NodeHandle,
    body: RigidBodyHandle,
    /// Bone head in the body's local frame.
    head_offset: Vec3,
}

#[derive(Debug, Clone, Copy)]
struct KinematicBone {
    node: NodeHandle,
    body: RigidBodyHandle,
}

/// Secondary motion for one model.
///
/// Bones selected by [`PhysicsConfig::bone_patterns`] become dynamic ball
/// bodies hanging from their parent by a spherical joint at the bone head.
/// Parents that are not simulated themselves are mirrored by kinematic
/// bodies following the animated pose. After each step the simulated
/// rotations are written back into the bones' local transforms.
#[derive(Debug)]
pub struct PhysicsBinding {
    world: PhysicsWorld,
    dynamic_bones: Vec<DynamicBone>,
    kinematic_bones: Vec<KinematicBone>,
    body_of: FxHashMap<NodeHandle, RigidBodyHandle>,
    accumulator: f32,
    max_substeps: u32,
}

impl PhysicsBinding {
    /// Builds bodies and joints for the subtree under `root`.
    ///
    /// World matrices in `scene` must be current.
    #[must_use]
    pub fn new(scene: &Scene, root: NodeHandle, config: &PhysicsConfig) -> Self {
        let gravity = Vec3::from_array(config.gravity);
        let mut binding = Self {
            world: PhysicsWorld::new(gravity, config.timestep.max(1e-4)),
            dynamic_bones: Vec::new(),
            kinematic_bones: Vec::new(),
            body_of: FxHashMap::default(),
            accumulator: 0.0,
            max_substeps: config.max_substeps.max(1),
        };

        for handle in scene.subtree(root) {
            if handle == root {
                continue;
            }
            let Some(node) = scene.get_node(handle) else {
                continue;
            };
            let Some(parent) = node.parent() else {
                continue;
            };
            if config.matches(&node.name) {
                binding.add_dynamic_bone(scene, handle, parent, config);
            }
        }

        log::info!(
            "Physics binding: {} dynamic bones, {} kinematic anchors",
            binding.dynamic_bones.len(),
            binding.kinematic_bones.len()
        );

        for _ in 0..config.warmup_steps {
            binding.world.step();
        }
        binding
    }

    #[inline]
    #[must_use]
    pub fn dynamic_bone_count(&self) -> usize {
        self.dynamic_bones.len()
    }

    fn add_dynamic_bone(
        &mut self,
        scene: &Scene,
        node: NodeHandle,
        parent: NodeHandle,
        config: &PhysicsConfig,
    ) {
        let Some(bone) = scene.get_node(node) else {
            return;
        };
        let head = bone.transform.world_position();
        let rotation = bone.transform.world_rotation();
        let parent_head = scene
            .get_node(parent)
            .map_or(head, |p| p.transform.world_position());

        let tail = bone
            .children()
            .first()
            .and_then(|&c| scene.get_node(c))
            .map(|c| c.transform.world_position())
            .filter(|t| t.distance_squared(head) > 1e-8)
            .unwrap_or_else(|| {
                let dir = head - parent_head;
                head + dir * 0.5
            });

        let length = tail.distance(head);
        let center = (head + tail) * 0.5;
        let radius = (length * config.radius_scale).max(config.min_radius);

        let body = RigidBodyBuilder::dynamic()
            .position(to_isometry(center, rotation))
            .linear_damping(config.linear_damping)
            .angular_damping(config.angular_damping)
            .can_sleep(false)
            .build();
        let body = self.world.rigid_body_set.insert(body);
        let collider = ColliderBuilder::ball(radius)
            .density(config.density)
            .collision_groups(InteractionGroups::none())
            .build();
        self.world
            .collider_set
            .insert_with_parent(collider, body, &mut self.world.rigid_body_set);

        let parent_body = self.parent_body(scene, parent);
        let (parent_position, parent_rotation) = {
            let rb = &self.world.rigid_body_set[parent_body];
            (from_translation(rb.translation()), from_rotation(rb.rotation()))
        };

        let head_offset = rotation.inverse() * (head - center);
        let anchor1 = parent_rotation.inverse() * (head - parent_position);
        let joint = GenericJointBuilder::new(JointAxesMask::LOCKED_SPHERICAL_AXES)
            .local_anchor1(to_point(anchor1))
            .local_anchor2(to_point(head_offset))
            .build();
        self.world
            .impulse_joint_set
            .insert(parent_body, body, joint, true);

        self.body_of.insert(node, body);
        self.dynamic_bones.push(DynamicBone {
            node,
            parent,
            body,
            head_offset,
        });
    }

    /// Body standing in for `parent`, creating a kinematic one on demand.
    fn parent_body(&mut self, scene: &Scene, parent: NodeHandle) -> RigidBodyHandle {
        if let Some(&body) = self.body_of.get(&parent) {
            return body;
        }
        let (position, rotation) = scene.get_node(parent).map_or(
            (Vec3::ZERO, Quat::IDENTITY),
            |p| (p.transform.world_position(), p.transform.world_rotation()),
        );
        let body = RigidBodyBuilder::kinematic_position_based()
            .position(to_isometry(position, rotation))
            .build();
        let body = self.world.rigid_body_set.insert(body);
        self.body_of.insert(parent, body);
        self.kinematic_bones.push(KinematicBone { node: parent, body });
        body
    }

    /// Moves kinematic anchors to the current animated pose.
    fn sync_kinematic(&mut self, scene: &Scene) {
        for anchor in &self.kinematic_bones {
            let Some(node) = scene.get_node(anchor.node) else {
                continue;
            };
            let iso = to_isometry(
                node.transform.world_position(),
                node.transform.world_rotation(),
            );
            if let Some(rb) = self.world.rigid_body_set.get_mut(anchor.body) {
                rb.set_next_kinematic_position(iso);
            }
        }
    }

    /// Steps the simulation at a fixed rate and writes bone rotations back.
    ///
    /// World matrices in `scene` must reflect the animated pose; callers
    /// refresh them again afterwards.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        self.sync_kinematic(scene);

        let step = self.world.timestep();
        self.accumulator += dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= step && steps < self.max_substeps {
            self.world.step();
            self.accumulator -= step;
            steps += 1;
        }
        if steps == self.max_substeps {
            self.accumulator = 0.0;
        }

        self.write_back(scene);
    }

    fn write_back(&self, scene: &mut Scene) {
        for bone in &self.dynamic_bones {
            let Some(rb) = self.world.rigid_body_set.get(bone.body) else {
                continue;
            };
            let body_rotation = from_rotation(rb.rotation());

            let parent_rotation = match self.body_of.get(&bone.parent) {
                Some(&pb) if self.is_dynamic(pb) => self
                    .world
                    .rigid_body_set
                    .get(pb)
                    .map_or(Quat::IDENTITY, |p| from_rotation(p.rotation())),
                _ => scene
                    .get_node(bone.parent)
                    .map_or(Quat::IDENTITY, |p| p.transform.world_rotation()),
            };

            if let Some(node) = scene.get_node_mut(bone.node) {
                node.transform.rotation = (parent_rotation.inverse() * body_rotation).normalize();
            }
        }
    }

    fn is_dynamic(&self, body: RigidBodyHandle) -> bool {
        self.world
            .rigid_body_set
            .get(body)
            .is_some_and(|rb| rb.is_dynamic())
    }

    /// Snaps every body back onto the current pose and clears velocities.
    pub fn reset(&mut self, scene: &Scene) {
        for anchor in &self.kinematic_bones {
            if let (Some(node), Some(rb)) = (
                scene.get_node(anchor.node),
                self.world.rigid_body_set.get_mut(anchor.body),
            ) {
                rb.set_position(
                    to_isometry(node.transform.world_position(), node.transform.world_rotation()),
                    true,
                );
            }
        }
        for bone in &self.dynamic_bones {
            let Some(node) = scene.get_node(bone.node) else {
                continue;
            };
            let rotation = node.transform.world_rotation();
            let center = node.transform.world_position() - rotation * bone.head_offset;
            if let Some(rb) = self.world.rigid_body_set.get_mut(bone.body) {
                rb.set_position(to_isometry(center, rotation), true);
                rb.set_linvel(vector![0.0, 0.0, 0.0], true);
                rb.set_angvel(vector![0.0, 0.0, 0.0], true);
            }
        }
        self.accumulator = 0.0;
    }
}
