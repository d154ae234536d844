//! Stage configuration
//!
//! Every field has a default, so an absent or partial `motion_stage.json`
//! is fine:
//!
//! ```json
//! {
//!   "window": { "title": "Motion Stage", "vsync": false },
//!   "assets": { "root": "assets", "ordering": "requested" },
//!   "helper": { "afterglow": 3.0 }
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::assets::ClipOrdering;
use crate::errors::Result;
use crate::helper::HelperConfig;
use crate::renderer::RenderSettings;
use crate::utils::ControlsConfig;

/// Motion files bundled with the default model.
const DEFAULT_MOTION_STEPS: [u32; 16] = [1, 5, 7, 8, 10, 17, 19, 20, 21, 22, 23, 28, 29, 31, 36, 37];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Logical pixels.
    pub width: f64,
    pub height: f64,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Motion Stage".to_string(),
            width: 1280.0,
            height: 720.0,
            vsync: true,
        }
    }
}

impl WindowConfig {
    #[must_use]
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            vsync: self.vsync,
            ..Default::default()
        }
    }
}

/// Scene constants. Colors are `0xRRGGBB`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub background: u32,
    pub camera_fov: f32,
    pub camera_near: f32,
    pub camera_far: f32,
    pub camera_position: [f32; 3],
    pub ambient_color: u32,
    pub directional_color: u32,
    pub directional_position: [f32; 3],
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub grid_color: u32,
    /// Height of both the grid and the model root.
    pub floor_y: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: 0x000f1e,
            camera_fov: 45.0,
            camera_near: 1.0,
            camera_far: 2000.0,
            camera_position: [0.0, 0.0, 30.0],
            ambient_color: 0x666666,
            directional_color: 0x666666,
            directional_position: [-1.0, 1.0, 1.0],
            grid_size: 50.0,
            grid_divisions: 15,
            grid_color: 0x00aeeb,
            floor_y: -10.0,
        }
    }
}

/// Which files to load, relative to `root`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetManifest {
    pub root: String,
    pub model: String,
    pub motions: Vec<String>,
    pub ordering: ClipOrdering,
    /// `None` issues every fetch at once.
    pub max_concurrent_fetches: Option<usize>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            root: "assets".to_string(),
            model: "models/mmd/alicia/Alicia_solid.glb".to_string(),
            motions: DEFAULT_MOTION_STEPS
                .iter()
                .map(|n| format!("models/mmd/motions/loop_step_{n}.glb"))
                .collect(),
            ordering: ClipOrdering::default(),
            max_concurrent_fetches: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub window: WindowConfig,
    pub scene: SceneConfig,
    pub assets: AssetManifest,
    pub helper: HelperConfig,
    pub controls: ControlsConfig,
}

impl StageConfig {
    /// # Errors
    ///
    /// Fails on malformed JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads `path` if it exists; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = StageConfig::from_json(
            r#"{ "assets": { "ordering": "requested" }, "helper": { "afterglow": 3.5 } }"#,
        )
        .unwrap();
        assert_eq!(config.assets.ordering, ClipOrdering::Requested);
        assert_eq!(config.assets.motions.len(), 16);
        assert!((config.helper.afterglow - 3.5).abs() < f32::EPSILON);
        assert_eq!(config.scene.background, 0x000f1e);
        assert!(config.window.vsync);
    }
}
