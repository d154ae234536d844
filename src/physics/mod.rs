//! rapier3d-backed secondary motion (hair, skirts, ribbons).

pub mod binding;
pub mod world;

pub use binding::{PhysicsBinding, PhysicsConfig};
pub use world::PhysicsWorld;
