use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::scene::color::Color;

/// A vertex of a line list (position + linear color).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Square ground grid on the XZ plane, drawn as a line list.
#[derive(Debug, Clone)]
pub struct GridHelper {
    pub size: f32,
    pub divisions: u32,
    pub center_color: Color,
    pub line_color: Color,
    /// World-space offset applied to every vertex.
    pub position: Vec3,
}

impl GridHelper {
    #[must_use]
    pub fn new(size: f32, divisions: u32, center_color: Color, line_color: Color) -> Self {
        Self {
            size,
            divisions: divisions.max(1),
            center_color,
            line_color,
            position: Vec3::ZERO,
        }
    }

    /// Generates `2 * (divisions + 1)` line segments in world space.
    #[must_use]
    pub fn vertices(&self) -> Vec<LineVertex> {
        let half = self.size / 2.0;
        let step = self.size / self.divisions as f32;
        let center = self.divisions / 2;
        let offset = self.position;

        let mut vertices = Vec::with_capacity((self.divisions as usize + 1) * 4);
        for i in 0..=self.divisions {
            let k = -half + i as f32 * step;
            let color = if i == center {
                self.center_color
            } else {
                self.line_color
            }
            .to_linear()
            .to_array();

            let mut push = |p: Vec3| {
                vertices.push(LineVertex {
                    position: (p + offset).to_array(),
                    color,
                });
            };
            push(Vec3::new(-half, 0.0, k));
            push(Vec3::new(half, 0.0, k));
            push(Vec3::new(k, 0.0, -half));
            push(Vec3::new(k, 0.0, half));
        }
        vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_spans_size_and_sits_at_offset() {
        let mut grid = GridHelper::new(50.0, 15, Color::from_hex(0x00aeeb), Color::from_hex(0x00aeeb));
        grid.position = Vec3::new(0.0, -10.0, 0.0);

        let vertices = grid.vertices();
        assert_eq!(vertices.len(), 16 * 4);
        assert!(vertices.iter().all(|v| (v.position[1] + 10.0).abs() < 1e-6));

        let max_x = vertices.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
        assert!((max_x - 25.0).abs() < 1e-4);
    }
}
