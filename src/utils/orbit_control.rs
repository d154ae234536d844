use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use serde::Deserialize;
use winit::event::MouseButton;

use crate::app::input::Input;
use crate::scene::Camera;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    pub enable_damping: bool,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            min_distance: 10.0,
            max_distance: 100.0,
            enable_damping: true,
        }
    }
}

/// Orbits the camera around `center` on a sphere.
///
/// Left drag rotates, right drag pans, the wheel dollies between
/// `min_distance` and `max_distance`.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,

    pub center: Vec3,
    pub radius: f32,
    /// Azimuth around +Y, zero looking down -Z.
    pub theta: f32,
    /// Polar angle from +Y.
    pub phi: f32,

    rotate_delta: Vec2,
}

impl OrbitControls {
    /// Derives the spherical coordinates from the camera's current position.
    #[must_use]
    pub fn from_camera(camera: &Camera, center: Vec3, config: &ControlsConfig) -> Self {
        let offset = camera.transform.position - center;
        let radius = offset.length().max(1e-3);
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            damping_factor: 0.05,
            enable_damping: config.enable_damping,
            min_distance: config.min_distance,
            max_distance: config.max_distance.max(config.min_distance),
            center,
            radius: radius.clamp(config.min_distance, config.max_distance.max(config.min_distance)),
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            rotate_delta: Vec2::ZERO,
        }
    }

    fn direction(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta)
    }

    pub fn update(&mut self, camera: &mut Camera, input: &Input, dt: f32) {
        let screen_height = input.screen_size.y.max(1.0);

        if input.is_button_pressed(MouseButton::Left) {
            let per_pixel = 2.0 * PI / screen_height * self.rotate_speed;
            self.rotate_delta -= input.cursor_delta * per_pixel;
        }

        if self.enable_damping {
            let retention = (1.0 - self.damping_factor).powf(dt * 60.0);
            let applied = self.rotate_delta * (1.0 - retention);
            self.theta += applied.x;
            self.phi += applied.y;
            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }

        const EPS: f32 = 1e-4;
        self.phi = self.phi.clamp(EPS, PI - EPS);

        if input.scroll_delta.y != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(input.scroll_delta.y.abs());
            if input.scroll_delta.y > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
        }
        self.radius = self.radius.clamp(self.min_distance, self.max_distance);

        if input.is_button_pressed(MouseButton::Right) {
            let world_height = 2.0 * self.radius * (camera.fov / 2.0).tan();
            let per_pixel = world_height / screen_height * self.pan_speed;

            let forward = -self.direction();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward).normalize_or_zero();
            self.center += (right * -input.cursor_delta.x + up * input.cursor_delta.y) * per_pixel;
        }

        camera.transform.position = self.center + self.direction() * self.radius;
        camera.look_at(self.center);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_camera_and_clamps_zoom() {
        let mut camera = Camera::new_perspective(45.0, 1.0, 1.0, 2000.0);
        camera.transform.position = Vec3::new(0.0, 0.0, 30.0);
        let mut controls = OrbitControls::from_camera(&camera, Vec3::ZERO, &ControlsConfig::default());
        assert!((controls.radius - 30.0).abs() < 1e-4);

        let mut input = Input::new();
        input.scroll_delta.y = 1000.0;
        controls.update(&mut camera, &input, 1.0 / 60.0);
        assert!((controls.radius - 10.0).abs() < 1e-4);
        assert!((camera.transform.position.length() - 10.0).abs() < 1e-3);

        input.scroll_delta.y = -1000.0;
        controls.update(&mut camera, &input, 1.0 / 60.0);
        assert!((controls.radius - 100.0).abs() < 1e-3);
    }
}
