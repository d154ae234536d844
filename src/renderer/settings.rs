//! Renderer settings
//!
//! Passed to [`App::with_settings`](crate::app::App::with_settings) and
//! consumed once when the GPU context is created.
//!
//! ```rust,ignore
//! let settings = RenderSettings {
//!     vsync: false,
//!     ..Default::default()
//! };
//! App::new().with_settings(settings).run::<StageApp>()?;
//! ```

/// GPU and presentation options.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Power preference for adapter selection.
    pub power_preference: wgpu::PowerPreference,
    /// Required wgpu features.
    pub required_features: wgpu::Features,
    /// Required wgpu limits.
    pub required_limits: wgpu::Limits,
    /// Depth buffer format.
    pub depth_format: wgpu::TextureFormat,
    /// Enable vertical sync.
    pub vsync: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            depth_format: wgpu::TextureFormat::Depth32Float,
            vsync: true,
        }
    }
}
