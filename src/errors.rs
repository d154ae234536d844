//! Error Types
//!
//! This module defines the error types used throughout the stage.
//!
//! # Overview
//!
//! The main error type [`Error`] covers:
//! - GPU initialization failures
//! - Asset reading and glTF decoding errors
//! - Configuration parsing errors
//! - Background task failures
//!
//! Load failures are never fatal for the running application: the loader
//! reports them through its completion channel and the stage logs them.
//!
//! ```rust,ignore
//! use motion_stage::errors::Result;
//!
//! fn load_manifest() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the stage.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create the presentation surface.
    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// glTF parsing or loading error.
    #[error("glTF error: {0}")]
    GltfError(String),

    /// The model file contained no skinned or static mesh.
    #[error("Model contains no meshes: {0}")]
    EmptyModel(String),

    /// The motion file contained no animation channels.
    #[error("Motion file contains no animation: {0}")]
    NoAnimation(String),

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUriError(String),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    // ========================================================================
    // Scene Errors
    // ========================================================================
    /// A model key did not resolve to a model in the scene.
    #[error("Model not found in scene")]
    ModelNotFound,

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ========================================================================
    // Async Errors
    // ========================================================================
    /// A background loading task panicked or was cancelled.
    #[error("Task join error: {0}")]
    TaskJoinError(String),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageDecodeError(err.to_string())
    }
}

impl From<gltf::Error> for Error {
    fn from(err: gltf::Error) -> Self {
        Error::GltfError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::TaskJoinError(err.to_string())
    }
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
