use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::geometry::Point;
use crate::interaction::{PointerButton, PointerEvent};

use super::DeskCommand;

/// Layout pixels covered by one terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseScale {
    pub x: i32,
    pub y: i32,
}

impl Default for MouseScale {
    fn default() -> Self {
        Self { x: 10, y: 20 }
    }
}

impl MouseScale {
    pub fn to_point(&self, column: u16, row: u16) -> Point {
        Point::new(i32::from(column) * self.x, i32::from(row) * self.y)
    }
}

/// Translate a terminal mouse event. Scroll events have no pointer meaning.
pub fn map_mouse(event: &MouseEvent, scale: MouseScale) -> Option<PointerEvent> {
    let position = scale.to_point(event.column, event.row);
    match event.kind {
        MouseEventKind::Down(button) => Some(PointerEvent::Down {
            position,
            button: map_button(button),
        }),
        MouseEventKind::Drag(_) | MouseEventKind::Moved => Some(PointerEvent::Move { position }),
        MouseEventKind::Up(_) => Some(PointerEvent::Up { position }),
        _ => None,
    }
}

fn map_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    }
}

/// Keyboard shortcuts: `a` adds a seat, `s` cycles the table shape, `q`,
/// `Esc` or `Ctrl-C` exit.
pub fn map_key(event: &KeyEvent) -> Option<DeskCommand> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    match event.code {
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(DeskCommand::Exit)
        }
        KeyCode::Esc | KeyCode::Char('q') => Some(DeskCommand::Exit),
        KeyCode::Char('a') => Some(DeskCommand::AddSeat),
        KeyCode::Char('s') => Some(DeskCommand::CycleTableShape),
        _ => None,
    }
}
