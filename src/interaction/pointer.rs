use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub client_x: f64,
    pub client_y: f64,
}

/// Mouse and touch input reduced to what the controller needs.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Mouse { client_x: f64, client_y: f64 },
    Touch { touches: Vec<TouchPoint> },
}

impl PointerEvent {
    pub fn mouse(client_x: f64, client_y: f64) -> Self {
        Self::Mouse { client_x, client_y }
    }

    pub fn touch(points: &[(f64, f64)]) -> Self {
        Self::Touch {
            touches: points
                .iter()
                .map(|&(client_x, client_y)| TouchPoint { client_x, client_y })
                .collect(),
        }
    }

    /// Pointer coordinates, or `None` for multi-touch or empty touch lists,
    /// which the controller ignores.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match self {
            Self::Mouse { client_x, client_y } => Some((*client_x, *client_y)),
            Self::Touch { touches } => match touches.as_slice() {
                [only] => Some((only.client_x, only.client_y)),
                _ => None,
            },
        }
    }
}

/// Terminal mouse events map cells onto the canvas coordinate space.
impl From<&MouseEvent> for PointerEvent {
    fn from(event: &MouseEvent) -> Self {
        Self::mouse(f64::from(event.column), f64::from(event.row))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Only the primary button drives gestures; scrolls and other buttons map
/// to `None`.
pub fn classify_mouse(event: &MouseEvent) -> Option<PointerPhase> {
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(PointerPhase::Down),
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            Some(PointerPhase::Move)
        }
        MouseEventKind::Up(MouseButton::Left) => Some(PointerPhase::Up),
        _ => None,
    }
}

pub fn is_cancel_key(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press && key.code == KeyCode::Esc
}
