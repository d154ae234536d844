//! Seams between the stage and the GPU.
//!
//! The stage only talks to [`FrameRenderer`] and [`OutputSurface`], so its
//! frame and resize logic can run against test doubles without a device.

use crate::scene::{Camera, Scene};

/// Window size in logical pixels plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale_factor: f32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f32, height: f32, scale_factor: f32) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    /// Builds a viewport from a physical size as reported by the window.
    #[must_use]
    pub fn from_physical(width: u32, height: u32, scale_factor: f32) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self::new(width as f32 / scale, height as f32 / scale, scale)
    }

    /// Drawing-buffer size: logical size times the pixel ratio.
    #[must_use]
    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.width * self.scale_factor).round() as u32,
            (self.height * self.scale_factor).round() as u32,
        )
    }

    /// `None` for a zero-height viewport.
    #[must_use]
    pub fn aspect(&self) -> Option<f32> {
        (self.height > 0.0).then(|| self.width / self.height)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Something whose drawing buffer follows the window size.
pub trait OutputSurface {
    /// Sets the drawing-buffer size in physical pixels.
    fn resize(&mut self, width: u32, height: u32);
}

/// GPU handles a [`RenderNode`] may need while preparing.
pub struct PrepareContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Physical size of the target.
    pub size: (u32, u32),
}

pub struct ExecuteContext<'a> {
    pub surface_view: &'a wgpu::TextureView,
}

/// An extra pass drawn on top of the scene (the GUI overlay).
pub trait RenderNode {
    fn name(&self) -> &'static str;

    /// Uploads resources. May submit its own command buffers.
    fn prepare(&mut self, ctx: &mut PrepareContext);

    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder);
}

/// Draws one frame of `scene` as seen from `camera`, then `overlays` in order.
pub trait FrameRenderer {
    fn render(&mut self, scene: &Scene, camera: &Camera, overlays: &mut [&mut dyn RenderNode]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_applies_pixel_ratio() {
        let viewport = Viewport::new(800.0, 600.0, 1.5);
        assert_eq!(viewport.physical_size(), (1200, 900));
        assert_eq!(Viewport::from_physical(1200, 900, 1.5), viewport);
        assert!(Viewport::new(800.0, 0.0, 1.0).aspect().is_none());
        assert!(Viewport::new(0.0, 600.0, 1.0).is_empty());
    }
}
