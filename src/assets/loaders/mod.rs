pub mod gltf;

pub use self::gltf::{ModelData, load_animations, load_model, load_motion};
