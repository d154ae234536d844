use std::sync::Arc;

use winit::event::WindowEvent;
use winit::window::Window;

use crate::app::AppHandler;
use crate::config::StageConfig;
use crate::engine::{Engine, FrameState};
use crate::errors::{Error, Result};
use crate::gui::UiPass;
use crate::renderer::{RenderNode, Viewport};
use crate::stage::StageContext;

/// Window front-end for [`StageContext`] with the egui overlay.
pub struct StageApp {
    stage: StageContext,
    ui: UiPass,
}

impl AppHandler for StageApp {
    type Config = StageConfig;

    fn init(engine: &mut Engine, window: &Arc<Window>, config: StageConfig) -> Result<Self> {
        let (Some(device), Some(format)) = (engine.renderer.device(), engine.renderer.color_format())
        else {
            return Err(Error::AdapterRequestFailed("renderer not initialized".to_string()));
        };
        let ui = UiPass::new(device, format, window);

        let size = window.inner_size();
        let viewport = Viewport::from_physical(size.width, size.height, window.scale_factor() as f32);

        let mut stage = StageContext::new(&config, viewport)?;
        stage.resize(viewport, &mut engine.renderer);
        stage.start_loading();

        Ok(Self { stage, ui })
    }

    fn on_event(&mut self, _engine: &mut Engine, window: &Arc<Window>, event: &WindowEvent) -> bool {
        self.ui.handle_input(window, event)
    }

    fn on_resize(&mut self, engine: &mut Engine, viewport: Viewport) {
        engine.input.handle_resize(viewport.width, viewport.height);
        self.stage.resize(viewport, &mut engine.renderer);
        self.ui.resize(viewport);
    }

    fn update(&mut self, engine: &mut Engine, window: &Arc<Window>, frame: &FrameState) {
        self.ui.begin_frame(window);
        let events = self.stage.show_panel(self.ui.context());
        self.ui.end_frame(window);
        self.stage.apply_panel_events(events);

        // Drags and scrolls over the panel must not orbit the camera.
        let input = if self.ui.wants_pointer_input() {
            engine.input.without_pointer()
        } else {
            engine.input.clone()
        };

        let mut overlays: [&mut dyn RenderNode; 1] = [&mut self.ui];
        self.stage
            .tick(frame.dt, &input, &mut engine.renderer, &mut overlays);
    }
}
