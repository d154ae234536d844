//! Asset loading: file access, glTF decoding and the background loader.

pub mod io;
pub mod loader;
pub mod loaders;

pub use io::{AssetReader, FileAssetReader};
pub use loader::{AssetLoader, ClipOrdering, LoadEvent};
pub use loaders::{ModelData, load_model, load_motion};
