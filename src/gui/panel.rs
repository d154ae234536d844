use crate::gui::controller::MotionController;
use crate::helper::{AnimationHelper, HelperFeature};
use crate::scene::{Color, ModelKey, Scene};

/// Values shown by the panel widgets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelState {
    pub animation: bool,
    pub color: Color,
}

/// A user interaction with the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEvent {
    ToggleAnimation(bool),
    BackgroundColor(Color),
    ChangeMotion,
}

/// The three-control panel: animation toggle, background color, motion switch.
///
/// [`show`](Self::show) only draws and reports events; all state changes go
/// through [`apply`](Self::apply).
#[derive(Debug, Clone)]
pub struct ControlPanel {
    state: PanelState,
    controller: MotionController,
}

impl ControlPanel {
    /// The toggle starts off; the color starts at the current background.
    #[must_use]
    pub fn new(model: ModelKey, background: Color) -> Self {
        Self {
            state: PanelState {
                animation: false,
                color: background,
            },
            controller: MotionController::new(model),
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &PanelState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn controller(&self) -> &MotionController {
        &self.controller
    }

    pub fn show(&self, ctx: &egui::Context) -> Vec<PanelEvent> {
        let mut events = Vec::new();

        egui::Window::new("Controls")
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                let mut animation = self.state.animation;
                if ui.checkbox(&mut animation, "animation").changed() {
                    events.push(PanelEvent::ToggleAnimation(animation));
                }

                ui.horizontal(|ui| {
                    let mut rgb = self.state.color.to_srgb_u8();
                    if ui.color_edit_button_srgb(&mut rgb).changed() {
                        events.push(PanelEvent::BackgroundColor(Color::from_srgb_u8(rgb)));
                    }
                    ui.label("color");
                });

                if ui.button("change motion").clicked() {
                    events.push(PanelEvent::ChangeMotion);
                }
            });

        events
    }

    pub fn apply(&mut self, event: PanelEvent, scene: &mut Scene, helper: &mut AnimationHelper) {
        match event {
            PanelEvent::ToggleAnimation(enabled) => {
                self.state.animation = enabled;
                helper.set_enabled(HelperFeature::Animation, enabled);
            }
            PanelEvent::BackgroundColor(color) => {
                self.state.color = color;
                scene.background = color;
            }
            PanelEvent::ChangeMotion => {
                if self.controller.change_motion(scene, helper) {
                    // Same path as ticking the box by hand.
                    self.apply(PanelEvent::ToggleAnimation(true), scene, helper);
                }
            }
        }
    }
}
