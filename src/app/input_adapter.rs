//! Translates winit window events into [`Input`] state.

use winit::event::WindowEvent;

use crate::app::input::Input;

/// Feeds pointer events to `input`. Cursor positions arrive in physical
/// pixels and are stored in logical pixels.
pub fn process_window_event(input: &mut Input, event: &WindowEvent, scale_factor: f32) {
    let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
    match event {
        WindowEvent::CursorMoved { position, .. } => {
            input.handle_cursor_move(position.x as f32 / scale, position.y as f32 / scale);
        }
        WindowEvent::CursorLeft { .. } => input.handle_cursor_left(),
        WindowEvent::MouseInput { state, button, .. } => {
            input.handle_mouse_input(*state, *button);
        }
        WindowEvent::MouseWheel { delta, .. } => input.handle_mouse_wheel(*delta),
        _ => {}
    }
}
