use std::sync::Arc;

use glam::Vec4;
use uuid::Uuid;

/// Decoded RGBA8 image data (sRGB encoded).
#[derive(Debug, Clone)]
pub struct TextureData {
    pub id: Uuid,
    pub name: Option<String>,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    #[must_use]
    pub fn new(name: Option<String>, width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            width,
            height,
            rgba,
        }
    }
}

/// Blend behavior derived from the glTF alpha mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

/// Lambert material: base color factor times an optional base color map.
#[derive(Debug, Clone)]
pub struct Material {
    pub id: Uuid,
    pub name: String,
    /// Linear RGBA factor.
    pub base_color: Vec4,
    pub base_color_map: Option<Arc<TextureData>>,
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
}

impl Material {
    #[must_use]
    pub fn new(name: impl Into<String>, base_color: Vec4) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            base_color,
            base_color_map: None,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
        }
    }

    #[must_use]
    pub fn with_map(mut self, map: Arc<TextureData>) -> Self {
        self.base_color_map = Some(map);
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("Default", Vec4::ONE)
    }
}
