//! Winit-based application framework
//!
//! - [`App`]: builder that configures the window and starts the event loop
//! - [`AppHandler`]: implemented by the application to receive lifecycle calls
//!
//! ```rust,ignore
//! App::new()
//!     .with_title("Motion Stage")
//!     .with_window_size(1280.0, 720.0)
//!     .run_with::<StageApp>(config)?;
//! ```

pub mod input;
pub mod input_adapter;

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
pub use winit::window::{Window, WindowId};

use crate::engine::{Engine, FrameState};
use crate::errors::Error;
use crate::renderer::{RenderSettings, Viewport};
use crate::utils::Clock;

/// Application lifecycle.
///
/// 1. [`init`](Self::init) once the window and GPU exist
/// 2. [`on_event`](Self::on_event) for every window event
/// 3. [`update`](Self::update) once per frame; the handler draws from there
pub trait AppHandler: Sized + 'static {
    /// Startup data handed to [`init`](Self::init).
    type Config: Default + 'static;

    /// # Errors
    ///
    /// An error aborts startup; the runner logs it and closes the event loop.
    fn init(engine: &mut Engine, window: &Arc<Window>, config: Self::Config) -> crate::errors::Result<Self>;

    /// Return `true` to consume the event; consumed events are not forwarded
    /// to the engine's input state.
    #[allow(unused_variables)]
    fn on_event(&mut self, engine: &mut Engine, window: &Arc<Window>, event: &WindowEvent) -> bool {
        false
    }

    /// Called on every window resize with the new logical size.
    fn on_resize(&mut self, engine: &mut Engine, viewport: Viewport) {
        engine.resize(viewport);
    }

    #[allow(unused_variables)]
    fn update(&mut self, engine: &mut Engine, window: &Arc<Window>, frame: &FrameState) {}
}

pub struct App {
    title: String,
    window_size: (f64, f64),
    render_settings: RenderSettings,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Motion Stage".into(),
            window_size: (1280.0, 720.0),
            render_settings: RenderSettings::default(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Initial inner size in logical pixels.
    #[must_use]
    pub fn with_window_size(mut self, width: f64, height: f64) -> Self {
        self.window_size = (width, height);
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.render_settings = settings;
        self
    }

    /// Runs `H` with its default config. Blocks until the window closes.
    ///
    /// # Errors
    ///
    /// Returns an error if event loop creation or execution fails.
    pub fn run<H: AppHandler>(self) -> crate::errors::Result<()> {
        self.run_with::<H>(H::Config::default())
    }

    /// # Errors
    ///
    /// Returns an error if event loop creation or execution fails.
    pub fn run_with<H: AppHandler>(self, config: H::Config) -> crate::errors::Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::<H>::new(self, config);
        event_loop.run_app(&mut runner).map_err(Error::from)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

struct AppRunner<H: AppHandler> {
    app: App,
    config: Option<H::Config>,

    window: Option<Arc<Window>>,
    engine: Option<Engine>,
    user_state: Option<H>,

    clock: Clock,
}

impl<H: AppHandler> AppRunner<H> {
    fn new(app: App, config: H::Config) -> Self {
        Self {
            app,
            config: Some(config),
            window: None,
            engine: None,
            user_state: None,
            clock: Clock::new(),
        }
    }

    fn frame(&mut self) {
        let dt = self.clock.delta();

        let (Some(window), Some(engine), Some(user_state)) =
            (&self.window, &mut self.engine, &mut self.user_state)
        else {
            return;
        };

        let frame_state = FrameState {
            time: self.clock.elapsed().as_secs_f32(),
            dt,
            frame_count: engine.frame_count(),
        };

        user_state.update(engine, window, &frame_state);
        engine.update(dt);
    }
}

impl<H: AppHandler> ApplicationHandler for AppRunner<H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self.app.window_size;
        let window_attributes = Window::default_attributes()
            .with_title(&self.app.title)
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        log::info!("Initializing Renderer Backend...");

        let mut engine = Engine::new(self.app.render_settings.clone());
        let size = window.inner_size();

        if let Err(e) = pollster::block_on(engine.init(window.clone(), size.width, size.height)) {
            log::error!("Fatal Renderer Error: {e}");
            event_loop.exit();
            return;
        }

        let viewport = Viewport::from_physical(size.width, size.height, window.scale_factor() as f32);
        engine.input.handle_resize(viewport.width, viewport.height);

        let config = self.config.take().unwrap_or_default();
        match H::init(&mut engine, &window, config) {
            Ok(user_state) => self.user_state = Some(user_state),
            Err(e) => {
                log::error!("Application init failed: {e}");
                event_loop.exit();
                return;
            }
        }
        self.engine = Some(engine);

        self.clock = Clock::new();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(window), Some(engine), Some(user_state)) =
            (&self.window, &mut self.engine, &mut self.user_state)
        else {
            return;
        };

        let consumed = user_state.on_event(engine, window, &event);
        let scale_factor = window.scale_factor() as f32;
        if !consumed {
            input_adapter::process_window_event(&mut engine.input, &event, scale_factor);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(physical_size) => {
                let viewport =
                    Viewport::from_physical(physical_size.width, physical_size.height, scale_factor);
                user_state.on_resize(engine, viewport);
            }
            WindowEvent::RedrawRequested => {
                self.frame();
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.engine.is_some()
            && let Some(window) = &self.window
        {
            window.request_redraw();
        }
    }
}
