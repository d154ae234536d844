//! Scene graph
//!
//! - Node: hierarchy entry with a transform
//! - Transform: local TRS plus cached matrices
//! - Scene: node pool, models, skeletons, lights and background
//! - Camera: perspective camera
//! - transform_system: decoupled matrix propagation

pub mod camera;
pub mod color;
pub mod grid;
pub mod light;
pub mod model;
pub mod node;
pub mod scene;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use camera::Camera;
pub use color::Color;
pub use grid::{GridHelper, LineVertex};
pub use light::{AmbientLight, DirectionalLight};
pub use model::{Model, ModelPrimitive};
pub use node::Node;
pub use scene::Scene;
pub use skeleton::Skeleton;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct ModelKey;
    pub struct SkeletonKey;
}
