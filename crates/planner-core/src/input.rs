//! Pointer and keyboard events delivered to the editor.

use crate::shapes::is_finite_point;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position } => position,
        }
    }

    /// Build an event from client (window) coordinates.
    pub fn from_client(kind: PointerPhase, client: Point, canvas_origin: Point) -> Self {
        let position = to_canvas(client, canvas_origin);
        match kind {
            PointerPhase::Down => PointerEvent::Down { position },
            PointerPhase::Move => PointerEvent::Move { position },
            PointerPhase::Up => PointerEvent::Up { position },
        }
    }

    /// Whether the event carries finite coordinates.
    pub fn is_valid(&self) -> bool {
        is_finite_point(self.position())
    }
}

/// Phase of a pointer gesture, used when translating shell events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Escape,
    Other(String),
}

impl Key {
    /// Map a DOM-style key name (`"Delete"`, `"Escape"`, ...) to a key.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Delete" => Key::Delete,
            "Escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }
}

/// Convert client coordinates to canvas coordinates.
pub fn to_canvas(client: Point, canvas_origin: Point) -> Point {
    client - canvas_origin.to_vec2()
}
