//! On-screen control panel (egui).

pub mod controller;
pub mod panel;
pub mod ui_pass;

pub use controller::MotionController;
pub use panel::{ControlPanel, PanelEvent, PanelState};
pub use ui_pass::UiPass;
