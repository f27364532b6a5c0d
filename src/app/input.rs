use bitflags::bitflags;
use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

bitflags! {
    /// Pointer buttons currently held down.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PointerButtons: u8 {
        const PRIMARY   = 1 << 0;
        const SECONDARY = 1 << 1;
        const AUXILIARY = 1 << 2;
    }
}

impl PointerButtons {
    /// Buttons other than the three main ones are not tracked.
    fn from_mouse(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => Self::PRIMARY,
            MouseButton::Right => Self::SECONDARY,
            MouseButton::Middle => Self::AUXILIARY,
            _ => Self::empty(),
        }
    }
}

/// Approximate pixels per wheel line, for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f32 = 10.0;

/// Pointer state gathered between two frames, in container pixels.
///
/// The host feeds window events in; [`OrbitControls`](crate::utils::OrbitControls)
/// reads the accumulated deltas once per frame, after which
/// [`end_frame`](Self::end_frame) clears them.
#[derive(Debug, Clone, Default)]
pub struct Input {
    pub cursor_position: Vec2,
    /// Pointer motion since the last frame.
    pub cursor_delta: Vec2,
    /// Wheel motion since the last frame, in lines.
    pub scroll_delta: Vec2,
    pub screen_size: Vec2,
    pub buttons: PointerButtons,
    /// Whether `cursor_position` is a real reading; the first move after
    /// entering the container produces no delta.
    cursor_inside: bool,
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

    pub fn handle_resize(&mut self, size: Vec2) {
        self.screen_size = size;
    }

    pub fn handle_cursor_move(&mut self, position: Vec2) {
        if self.cursor_inside {
            self.cursor_delta += position - self.cursor_position;
        }
        self.cursor_position = position;
        self.cursor_inside = true;
    }

    /// Leaving the container releases every button, so a drag never sticks.
    pub fn handle_cursor_left(&mut self) {
        self.cursor_inside = false;
        self.buttons = PointerButtons::empty();
    }

    pub fn handle_mouse_input(&mut self, state: ElementState, button: MouseButton) {
        self.buttons
            .set(PointerButtons::from_mouse(button), state == ElementState::Pressed);
    }

    pub fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        self.scroll_delta += match delta {
            MouseScrollDelta::LineDelta(x, y) => Vec2::new(x, y),
            MouseScrollDelta::PixelDelta(pos) => Vec2::new(pos.x as f32, pos.y as f32) / PIXELS_PER_LINE,
        };
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        let flag = PointerButtons::from_mouse(button);
        !flag.is_empty() && self.buttons.contains(flag)
    }
}
