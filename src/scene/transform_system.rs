//! Scene graph matrix propagation.
//!
//! Kept apart from [`Scene`](crate::scene::Scene) so callers that only hold
//! the node pool (physics write-back, tests) can refresh world matrices
//! without borrowing the rest of the scene.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::{Node, NodeHandle};

/// Walks the hierarchy from `roots` and refreshes world matrices.
///
/// Uses an explicit stack, so deep bone chains cannot overflow. A node's
/// world matrix is only recomposed when its local TRS or an ancestor changed.
pub fn update_hierarchy(nodes: &mut SlotMap<NodeHandle, Node>, roots: &[NodeHandle]) {
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);
    for &root in roots.iter().rev() {
        stack.push((root, Affine3A::IDENTITY, false));
    }

    while let Some((handle, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let changed = local_changed || parent_changed;
        if changed {
            let world = parent_world * *node.transform.local_matrix();
            node.transform.set_world_matrix(world);
        }

        let world = node.transform.world_matrix;
        for &child in node.children.iter().rev() {
            stack.push((child, world, changed));
        }
    }
}

/// Refreshes the subtree under `root`, using the parent's cached world matrix.
pub fn update_subtree(nodes: &mut SlotMap<NodeHandle, Node>, root: NodeHandle) {
    let parent_world = nodes
        .get(root)
        .and_then(|n| n.parent)
        .and_then(|p| nodes.get(p))
        .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix);

    if let Some(node) = nodes.get_mut(root) {
        node.transform.mark_dirty();
    }

    let mut stack = vec![(root, parent_world, true)];
    while let Some((handle, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };
        let changed = node.transform.update_local_matrix() || parent_changed;
        if changed {
            let world = parent_world * *node.transform.local_matrix();
            node.transform.set_world_matrix(world);
        }
        let world = node.transform.world_matrix;
        for &child in node.children.iter().rev() {
            stack.push((child, world, changed));
        }
    }
}
