use glam::Vec3;
use slotmap::SlotMap;

use crate::scene::color::Color;
use crate::scene::grid::GridHelper;
use crate::scene::light::{AmbientLight, DirectionalLight};
use crate::scene::model::Model;
use crate::scene::node::Node;
use crate::scene::skeleton::Skeleton;
use crate::scene::transform_system;
use crate::scene::{ModelKey, NodeHandle, SkeletonKey};

/// Scene graph container.
///
/// Pure data: node hierarchy, instantiated models with their skeletons,
/// the two lights of the stage, an optional ground grid and the background
/// color the renderer clears to.
#[derive(Debug)]
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    pub models: SlotMap<ModelKey, Model>,
    pub skeletons: SlotMap<SkeletonKey, Skeleton>,

    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub grid: Option<GridHelper>,

    pub background: Color,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            models: SlotMap::with_key(),
            skeletons: SlotMap::with_key(),
            ambient: AmbientLight::new(Color::BLACK),
            directional: DirectionalLight::new(Color::BLACK, Vec3::Y),
            grid: None,
            background: Color::BLACK,
        }
    }

    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_to_parent(&mut self, child: Node, parent: NodeHandle) -> NodeHandle {
        let handle = self.nodes.insert(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(handle);
            self.nodes[handle].parent = Some(parent);
        } else {
            log::warn!("Parent node not found, adding child as root");
            self.root_nodes.push(handle);
        }
        handle
    }

    /// Re-parents `child` under `parent`, detaching it from its old parent.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            log::error!("Node not found during attach!");
            return;
        }

        match self.nodes[child].parent {
            Some(old) => {
                if let Some(n) = self.nodes.get_mut(old) {
                    n.children.retain(|&c| c != child);
                }
            }
            None => self.root_nodes.retain(|&r| r != child),
        }

        self.nodes[parent].children.push(child);
        let node = &mut self.nodes[child];
        node.parent = Some(parent);
        node.transform.mark_dirty();
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Depth-first search for a node called `name` in the subtree under `root`
    /// (inclusive).
    #[must_use]
    pub fn find_node_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            if node.name == name {
                return Some(handle);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Every node in the subtree under `root`, parents before children.
    #[must_use]
    pub fn subtree(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            out.push(handle);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonKey {
        self.skeletons.insert(skeleton)
    }

    pub fn add_model(&mut self, model: Model) -> ModelKey {
        self.models.insert(model)
    }

    #[inline]
    #[must_use]
    pub fn model(&self, key: ModelKey) -> Option<&Model> {
        self.models.get(key)
    }

    #[inline]
    pub fn model_mut(&mut self, key: ModelKey) -> Option<&mut Model> {
        self.models.get_mut(key)
    }

    /// Propagates local transforms down the whole hierarchy.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy(&mut self.nodes, &self.root_nodes);
    }

    pub fn update_skeletons(&mut self) {
        let nodes = &self.nodes;
        for skeleton in self.skeletons.values_mut() {
            skeleton.compute_joint_matrices(nodes);
        }
    }

    /// Per-frame refresh before drawing: world matrices, then joint palettes.
    pub fn update(&mut self) {
        self.update_matrix_world();
        self.update_skeletons();
    }
}
