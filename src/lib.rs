#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Motion Stage
//!
//! Loads a skinned character and a set of motion clips, plays them with
//! physics-driven secondary motion and exposes a small control panel.
//!
//! ```rust,ignore
//! let config = StageConfig::load_or_default("motion_stage.json")?;
//! App::new()
//!     .with_title(config.window.title.clone())
//!     .with_settings(config.window.render_settings())
//!     .run_with::<StageApp>(config)?;
//! ```

pub mod animation;
pub mod app;
pub mod assets;
pub mod config;
pub mod engine;
pub mod errors;
pub mod gui;
pub mod helper;
pub mod physics;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod stage;
pub mod utils;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, Binder, LoopMode};
pub use app::{App, AppHandler};
pub use assets::{AssetLoader, ClipOrdering, LoadEvent};
pub use config::StageConfig;
pub use engine::{Engine, FrameState};
pub use errors::{Error, Result};
pub use helper::{AnimationHelper, HelperConfig, HelperFeature, HelperOptions};
pub use renderer::{FrameRenderer, OutputSurface, RenderSettings, Renderer, Viewport};
pub use scene::{Camera, Color, Model, Scene};
pub use stage::{StageApp, StageContext};
