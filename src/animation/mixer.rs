use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::animation::action::{AnimationAction, TrackValue};
use crate::animation::binder::Binder;
use crate::animation::binding::{RestPose, TargetPath};
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene};

/// Index of an action inside its [`AnimationMixer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionHandle(usize);

/// Plays clips on the node subtree under `root`.
///
/// Actions are created once per clip and cached, so calling
/// [`clip_action`](Self::clip_action) repeatedly for the same clip returns
/// the same handle. Before a node is first animated its local TRS is
/// recorded; stopping every action puts those rest poses back.
#[derive(Debug)]
pub struct AnimationMixer {
    root: NodeHandle,
    actions: Vec<AnimationAction>,
    rest_poses: FxHashMap<NodeHandle, RestPose>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new(root: NodeHandle) -> Self {
        Self {
            root,
            actions: Vec::new(),
            rest_poses: FxHashMap::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Returns the cached action for `clip`, binding it on first use.
    pub fn clip_action(&mut self, clip: &Arc<AnimationClip>, scene: &Scene) -> ActionHandle {
        if let Some(i) = self
            .actions
            .iter()
            .position(|a| Arc::ptr_eq(a.clip(), clip))
        {
            return ActionHandle(i);
        }

        let bindings = Binder::bind(scene, self.root, clip);
        for binding in &bindings {
            if let Some(node) = scene.get_node(binding.node_handle) {
                self.rest_poses
                    .entry(binding.node_handle)
                    .or_insert_with(|| RestPose::capture(&node.transform));
            }
        }

        log::debug!("Created action for clip '{}' ({} bindings)", clip.name, bindings.len());
        self.actions.push(AnimationAction::new(clip.clone(), bindings));
        ActionHandle(self.actions.len() - 1)
    }

    #[must_use]
    pub fn action(&self, handle: ActionHandle) -> Option<&AnimationAction> {
        self.actions.get(handle.0)
    }

    pub fn action_mut(&mut self, handle: ActionHandle) -> Option<&mut AnimationAction> {
        self.actions.get_mut(handle.0)
    }

    pub fn play(&mut self, handle: ActionHandle) {
        if let Some(action) = self.actions.get_mut(handle.0) {
            action.play();
        }
    }

    /// Stops every action and restores the rest pose of animated nodes.
    pub fn stop_all_action(&mut self, scene: &mut Scene) {
        for action in &mut self.actions {
            action.stop();
        }
        for (&handle, pose) in &self.rest_poses {
            if let Some(node) = scene.get_node_mut(handle) {
                pose.restore(&mut node.transform);
            }
        }
    }

    /// Number of scheduled actions.
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_running()).count()
    }

    /// Whether any action is still advancing in time.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.actions.iter().any(AnimationAction::is_playing)
    }

    #[must_use]
    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    /// Advances every action by `dt` and writes sampled values to nodes.
    ///
    /// Paused and finished actions still hold their pose.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        for action in &mut self.actions {
            action.advance(dt);
        }

        for action in &mut self.actions {
            if !action.is_running() || action.weight <= 0.0 {
                continue;
            }
            let weight = action.weight.min(1.0);

            for i in 0..action.bindings.len() {
                let binding = action.bindings[i];
                let Some(value) = action.sample_track(binding.track_index) else {
                    continue;
                };
                let Some(node) = scene.get_node_mut(binding.node_handle) else {
                    continue;
                };
                let transform = &mut node.transform;

                match (binding.target, value) {
                    (TargetPath::Translation, TrackValue::Vector3(v)) => {
                        transform.position = transform.position.lerp(v, weight);
                    }
                    (TargetPath::Scale, TrackValue::Vector3(v)) => {
                        transform.scale = transform.scale.lerp(v, weight);
                    }
                    (TargetPath::Rotation, TrackValue::Quaternion(q)) => {
                        transform.rotation = if weight >= 1.0 {
                            q
                        } else {
                            transform.rotation.slerp(q, weight)
                        };
                    }
                    _ => {}
                }
            }
        }
    }
}
