use std::sync::Arc;

use crate::animation::AnimationClip;
use crate::resources::{Geometry, Material};
use crate::scene::{NodeHandle, SkeletonKey};

/// One drawable piece of a model.
#[derive(Debug, Clone)]
pub struct ModelPrimitive {
    /// Node whose world matrix places unskinned geometry.
    pub node: NodeHandle,
    pub geometry: Arc<Geometry>,
    pub material: Arc<Material>,
    pub skeleton: Option<SkeletonKey>,
}

/// A skinned character instantiated into a [`Scene`](crate::scene::Scene).
///
/// `root` is the node that positions the whole model; bones and mesh nodes
/// hang underneath it.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub root: NodeHandle,
    pub primitives: Vec<ModelPrimitive>,
    pub skeletons: Vec<SkeletonKey>,
    /// Clips that shipped inside the model file itself.
    pub animations: Vec<Arc<AnimationClip>>,
}

impl Model {
    #[inline]
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        !self.skeletons.is_empty()
    }
}
