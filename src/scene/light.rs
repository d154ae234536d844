use glam::Vec3;

use crate::scene::color::Color;

/// Uniform light applied to every surface regardless of orientation.
#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl AmbientLight {
    #[must_use]
    pub fn new(color: Color) -> Self {
        Self {
            color,
            intensity: 1.0,
        }
    }
}

/// Light arriving from an infinitely distant source.
///
/// The light shines from `position` toward the origin.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

impl DirectionalLight {
    #[must_use]
    pub fn new(color: Color, position: Vec3) -> Self {
        Self {
            color,
            intensity: 1.0,
            position,
        }
    }

    /// Unit vector pointing from the surface toward the light.
    #[must_use]
    pub fn direction_to_light(&self) -> Vec3 {
        self.position.normalize_or(Vec3::Y)
    }
}
