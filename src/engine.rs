//! Engine Core
//!
//! [`Engine`] bundles the renderer with the per-frame input state. It has no
//! window logic of its own; the app runner drives it.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::app::input::Input;
use crate::renderer::{OutputSurface, RenderSettings, Renderer, Viewport};

/// Timing information handed to the app handler every frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameState {
    /// Seconds since the runner started.
    pub time: f32,
    /// Seconds since the previous frame, clamped by the frame clock.
    pub dt: f32,
    pub frame_count: u64,
}

pub struct Engine {
    pub renderer: Renderer,
    pub input: Input,

    time: f32,
    frame_count: u64,
}

impl Engine {
    /// GPU resources are not allocated until [`init`](Self::init).
    #[must_use]
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            renderer: Renderer::new(settings),
            input: Input::new(),
            time: 0.0,
            frame_count: 0,
        }
    }

    /// # Errors
    ///
    /// Fails when no adapter, device or surface can be created for `window`.
    pub async fn init<W>(&mut self, window: W, width: u32, height: u32) -> crate::errors::Result<()>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        self.renderer.init(window, width, height).await
    }

    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Resizes the drawing buffer to the viewport's physical size.
    pub fn resize(&mut self, viewport: Viewport) {
        self.input.handle_resize(viewport.width, viewport.height);
        if viewport.is_empty() {
            return;
        }
        let (width, height) = viewport.physical_size();
        self.renderer.resize(width, height);
    }

    /// Closes the frame: advances the clock and clears per-frame input deltas.
    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        self.frame_count += 1;
        self.input.end_frame();
    }
}
