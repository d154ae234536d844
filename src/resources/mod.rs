//! CPU-side render resources: geometry, materials and decoded textures.
//!
//! These are produced by the glTF loader on a background thread and handed
//! to the scene; the renderer uploads them lazily on first draw.

pub mod geometry;
pub mod material;

pub use geometry::{Geometry, Vertex};
pub use material::{AlphaMode, Material, TextureData};
