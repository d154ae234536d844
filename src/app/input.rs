use glam::Vec2;
use rustc_hash::FxHashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Per-frame pointer state fed to the orbit controls.
///
/// Positions are logical pixels. Deltas accumulate between frames and are
/// cleared by [`end_frame`](Self::end_frame).
#[derive(Default, Debug, Clone)]
pub struct Input {
    pub cursor_position: Option<Vec2>,
    pub cursor_delta: Vec2,
    pub scroll_delta: Vec2,
    pub screen_size: Vec2,
    pub mouse_buttons: FxHashSet<MouseButton>,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn end_frame(&mut self) {
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    pub fn handle_resize(&mut self, width: f32, height: f32) {
        self.screen_size = Vec2::new(width, height);
    }

    pub fn handle_cursor_move(&mut self, x: f32, y: f32) {
        let position = Vec2::new(x, y);
        if let Some(previous) = self.cursor_position {
            self.cursor_delta += position - previous;
        }
        self.cursor_position = Some(position);
    }

    pub fn handle_cursor_left(&mut self) {
        self.cursor_position = None;
        self.mouse_buttons.clear();
    }

    pub fn handle_mouse_input(&mut self, state: ElementState, button: MouseButton) {
        match state {
            ElementState::Pressed => {
                self.mouse_buttons.insert(button);
            }
            ElementState::Released => {
                self.mouse_buttons.remove(&button);
            }
        }
    }

    pub fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        self.scroll_delta += match delta {
            MouseScrollDelta::LineDelta(x, y) => Vec2::new(x, y),
            // Trackpads report pixels; scale down to roughly one line per notch.
            MouseScrollDelta::PixelDelta(pos) => Vec2::new(pos.x as f32, pos.y as f32) * 0.1,
        };
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    /// This frame's input with pointer motion, wheel and buttons removed,
    /// for when an overlay has taken the pointer.
    #[must_use]
    pub fn without_pointer(&self) -> Self {
        Self {
            cursor_position: self.cursor_position,
            screen_size: self.screen_size,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cursor_event_has_no_delta() {
        let mut input = Input::new();
        input.handle_cursor_move(100.0, 50.0);
        assert_eq!(input.cursor_delta, Vec2::ZERO);
        input.handle_cursor_move(110.0, 40.0);
        assert_eq!(input.cursor_delta, Vec2::new(10.0, -10.0));
        input.end_frame();
        assert_eq!(input.cursor_delta, Vec2::ZERO);
    }

    #[test]
    fn without_pointer_drops_drag_and_wheel() {
        let mut input = Input::new();
        input.handle_resize(800.0, 600.0);
        input.handle_cursor_move(10.0, 10.0);
        input.handle_mouse_input(ElementState::Pressed, MouseButton::Left);
        input.handle_cursor_move(30.0, 10.0);
        input.handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, 2.0));

        let blocked = input.without_pointer();
        assert!(!blocked.is_button_pressed(MouseButton::Left));
        assert_eq!(blocked.cursor_delta, Vec2::ZERO);
        assert_eq!(blocked.scroll_delta, Vec2::ZERO);
        assert_eq!(blocked.screen_size, Vec2::new(800.0, 600.0));
        assert!(input.is_button_pressed(MouseButton::Left));
    }
}
