//! The stage: one model, its motions, the helper and the control panel.
//!
//! [`StageContext`] owns all mutable state and is driven from the UI thread.
//! It never touches the GPU directly; drawing and resizing go through
//! [`FrameRenderer`] and [`OutputSurface`], which lets the frame and resize
//! logic run headless.

pub mod app;
pub mod setup;

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec3;

use crate::app::input::Input;
use crate::assets::{AssetLoader, LoadEvent};
use crate::config::{AssetManifest, StageConfig};
use crate::errors::Result;
use crate::gui::{ControlPanel, PanelEvent};
use crate::helper::{AnimationHelper, HelperOptions};
use crate::renderer::{FrameRenderer, OutputSurface, RenderNode, Viewport};
use crate::scene::{Camera, ModelKey, Scene};
use crate::utils::OrbitControls;

pub use self::app::StageApp;
pub use self::setup::setup_scene;

pub struct StageContext {
    pub scene: Scene,
    pub camera: Camera,
    pub helper: AnimationHelper,
    pub controls: OrbitControls,

    loader: AssetLoader,
    manifest: AssetManifest,
    floor_y: f32,
    viewport: Viewport,

    model: Option<ModelKey>,
    panel: Option<ControlPanel>,
}

impl std::fmt::Debug for StageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageContext")
            .field("viewport", &self.viewport)
            .field("model", &self.model)
            .field("panel", &self.panel.is_some())
            .field("pending_loads", &self.loader.pending())
            .finish_non_exhaustive()
    }
}

impl StageContext {
    /// Sets up the scene and the loader. Nothing is requested yet; call
    /// [`start_loading`](Self::start_loading).
    ///
    /// # Errors
    ///
    /// Fails when the loader runtime cannot be started.
    pub fn new(config: &StageConfig, viewport: Viewport) -> Result<Self> {
        let (scene, camera) = setup_scene(&config.scene, viewport);
        let controls = OrbitControls::from_camera(&camera, Vec3::ZERO, &config.controls);
        let loader = AssetLoader::new(
            &config.assets.root,
            config.assets.ordering,
            config.assets.max_concurrent_fetches,
        )?;

        Ok(Self {
            scene,
            camera,
            helper: AnimationHelper::new(config.helper.clone()),
            controls,
            loader,
            manifest: config.assets.clone(),
            floor_y: config.scene.floor_y,
            viewport,
            model: None,
            panel: None,
        })
    }

    /// Requests the model. Motions follow once it has arrived.
    pub fn start_loading(&mut self) {
        let path = self.manifest.model.clone();
        self.loader.request_model(&path);
    }

    #[inline]
    #[must_use]
    pub fn model(&self) -> Option<ModelKey> {
        self.model
    }

    #[inline]
    #[must_use]
    pub fn panel(&self) -> Option<&ControlPanel> {
        self.panel.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Loads still running or waiting to be handled.
    #[inline]
    #[must_use]
    pub fn pending_loads(&self) -> usize {
        self.loader.pending()
    }

    /// Clips attached to the model so far.
    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.model
            .and_then(|key| self.scene.model(key))
            .map_or(0, |m| m.animations.len())
    }

    pub fn handle_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Model { path, result } => match result {
                Ok(data) => {
                    let mut model = data.instantiate(&mut self.scene);
                    model.animations.clear();
                    if let Some(root) = self.scene.get_node_mut(model.root) {
                        root.transform.position.y = self.floor_y;
                    }

                    self.loader.request_motions(&self.manifest.motions);

                    let key = self.scene.add_model(model);
                    self.model = Some(key);
                    let options = HelperOptions {
                        animations: Vec::new(),
                        physics: true,
                    };
                    if let Err(e) = self.helper.add(key, &mut self.scene, options) {
                        log::warn!("Failed to register '{path}' with the helper: {e}");
                    }
                    log::info!("Model '{path}' ready");
                }
                Err(e) => log::warn!("Failed to load model '{path}': {e}"),
            },
            LoadEvent::Motion {
                index,
                path,
                result,
            } => match result {
                Ok(clip) => {
                    let Some(key) = self.model else {
                        log::debug!("Motion '{path}' arrived without a model");
                        return;
                    };
                    let Some(model) = self.scene.model_mut(key) else {
                        return;
                    };
                    log::debug!("Motion #{index} '{}' attached as clip {}", clip.name, model.animations.len());
                    model.animations.push(Arc::new(clip));

                    if self.panel.is_none() {
                        log::info!("First motion ready, building control panel");
                        self.panel = Some(ControlPanel::new(key, self.scene.background));
                    }
                }
                Err(e) => log::warn!("Failed to load motion '{path}': {e}"),
            },
        }
    }

    /// Handles every completion that arrived since the last call.
    pub fn process_loads(&mut self) -> usize {
        let events = self.loader.poll_events();
        let count = events.len();
        for event in events {
            self.handle_load_event(event);
        }
        count
    }

    /// Blocks until nothing is pending or `timeout` elapses.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut handled = 0;
        while self.loader.pending() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let Some(event) = self.loader.wait_event(remaining) else {
                break;
            };
            self.handle_load_event(event);
            handled += 1;
        }
        handled
    }

    /// Draws the panel widgets and returns what the user did this frame.
    #[must_use]
    pub fn show_panel(&self, ctx: &egui::Context) -> Vec<PanelEvent> {
        self.panel.as_ref().map(|p| p.show(ctx)).unwrap_or_default()
    }

    pub fn apply_panel_events(&mut self, events: impl IntoIterator<Item = PanelEvent>) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        for event in events {
            panel.apply(event, &mut self.scene, &mut self.helper);
        }
    }

    /// Frame logic without drawing: loads, helper, camera.
    pub fn update(&mut self, dt: f32, input: &Input) {
        self.process_loads();
        self.helper.update(dt, &mut self.scene);
        self.controls.update(&mut self.camera, input, dt);
        self.camera.update_view_matrix();
    }

    pub fn render<R>(&self, renderer: &mut R, overlays: &mut [&mut dyn RenderNode])
    where
        R: FrameRenderer + ?Sized,
    {
        renderer.render(&self.scene, &self.camera, overlays);
    }

    /// One frame: [`update`](Self::update) then exactly one render.
    pub fn tick<R>(
        &mut self,
        dt: f32,
        input: &Input,
        renderer: &mut R,
        overlays: &mut [&mut dyn RenderNode],
    ) where
        R: FrameRenderer + ?Sized,
    {
        self.update(dt, input);
        self.render(renderer, overlays);
    }

    /// Matches camera aspect and surface size to `viewport`. Empty viewports
    /// are ignored.
    pub fn resize<S>(&mut self, viewport: Viewport, surface: &mut S)
    where
        S: OutputSurface + ?Sized,
    {
        let Some(aspect) = viewport.aspect().filter(|_| !viewport.is_empty()) else {
            log::debug!("Ignoring empty viewport {viewport:?}");
            return;
        };
        self.camera.set_aspect(aspect);

        let (width, height) = viewport.physical_size();
        surface.resize(width, height);
        self.viewport = viewport;
    }
}
