use glam::Vec3;

use crate::config::SceneConfig;
use crate::renderer::Viewport;
use crate::scene::{AmbientLight, Camera, Color, DirectionalLight, GridHelper, Scene};

/// Builds the empty stage: background, lights, grid and the camera.
#[must_use]
pub fn setup_scene(config: &SceneConfig, viewport: Viewport) -> (Scene, Camera) {
    let mut scene = Scene::new();
    scene.background = Color::from_hex(config.background);

    scene.ambient = AmbientLight::new(Color::from_hex(config.ambient_color));
    scene.directional = DirectionalLight::new(
        Color::from_hex(config.directional_color),
        Vec3::from(config.directional_position).normalize_or(Vec3::Y),
    );

    let grid_color = Color::from_hex(config.grid_color);
    let mut grid = GridHelper::new(config.grid_size, config.grid_divisions, grid_color, grid_color);
    grid.position.y = config.floor_y;
    scene.grid = Some(grid);

    let mut camera = Camera::new_perspective(
        config.camera_fov,
        viewport.aspect().unwrap_or(1.0),
        config.camera_near,
        config.camera_far,
    );
    camera.transform.position = Vec3::from(config.camera_position);
    camera.look_at(Vec3::ZERO);
    camera.update_view_matrix();

    (scene, camera)
}
