//! Input abstraction layer.
//!
//! Normalizes host pointer and wheel events into a unified `InputEvent`
//! consumed by the session dispatcher. All coordinates are in scene space.

use uml_core::Point;

/// A normalized input event from any pointing device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start).
    PointerDown { x: f64, y: f64 },

    /// Pointer moved while pressed.
    PointerMove { x: f64, y: f64 },

    /// Pointer released.
    PointerUp { x: f64, y: f64 },

    /// Wheel / trackpad scroll at a pointer position.
    /// Only the sign of `delta` matters: positive zooms in.
    Scroll { x: f64, y: f64, delta: f64 },
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64) -> Self {
        Self::PointerDown { x, y }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp { x, y }
    }

    pub fn scroll(x: f64, y: f64, delta: f64) -> Self {
        Self::Scroll { x, y, delta }
    }

    /// Scene-space pointer position carried by the event.
    pub fn position(&self) -> Point {
        match *self {
            Self::PointerDown { x, y }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::Scroll { x, y, .. } => Point::new(x, y),
        }
    }
}
