//! Utility Module
//!
//! - [`OrbitControls`]: camera orbit controller with distance limits
//! - [`Clock`]: frame delta timing

pub mod orbit_control;
pub mod time;

pub use orbit_control::{ControlsConfig, OrbitControls};
pub use time::Clock;
