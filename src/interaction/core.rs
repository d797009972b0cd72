use crate::config::DeskConfig;
use crate::geometry::Point;
use crate::model::{DeskLayout, SeatId};

use super::hit::{PointerTarget, ResizeHandle, hit_test};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Raw pointer input in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down { position: Point, button: PointerButton },
    Move { position: Point },
    Up { position: Point },
}

/// Gesture state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InteractionState {
    #[default]
    Idle,
    DraggingSeat { seat: SeatId, last: Point },
    DraggingTable { last: Point },
    Resizing { handle: ResizeHandle, last: Point },
}

impl InteractionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DraggingSeat { .. } => "dragging_seat",
            Self::DraggingTable { .. } => "dragging_table",
            Self::Resizing { .. } => "resizing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Follow-ups the host performs after a controller call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerAction {
    /// The layout or table offset changed; re-render.
    Render,
    /// A mutation settled; flush the layout to persistence.
    Persist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub handle_size: i32,
    pub table_drag: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            handle_size: 12,
            table_drag: true,
        }
    }
}

impl From<&DeskConfig> for ControllerSettings {
    fn from(config: &DeskConfig) -> Self {
        Self {
            handle_size: config.handle_size,
            table_drag: config.table_drag,
        }
    }
}

/// Translates pointer input into layout mutations.
///
/// The controller owns only gesture state and the table's display offset;
/// the layout is borrowed for each call so every mutation goes through
/// [`DeskLayout`]'s clamping operations.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: InteractionState,
    table_offset: Point,
    settings: ControllerSettings,
}

impl InteractionController {
    pub fn new(settings: ControllerSettings) -> Self {
        Self {
            state: InteractionState::Idle,
            table_offset: Point::origin(),
            settings,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn table_offset(&self) -> Point {
        self.table_offset
    }

    pub fn settings(&self) -> ControllerSettings {
        self.settings
    }

    pub fn hit(&self, layout: &DeskLayout, position: Point) -> PointerTarget {
        hit_test(layout, self.table_offset, position, self.settings.handle_size)
    }

    pub fn handle(&mut self, layout: &mut DeskLayout, event: PointerEvent) -> Vec<ControllerAction> {
        match event {
            PointerEvent::Down { position, button } => self.on_pointer_down(layout, position, button),
            PointerEvent::Move { position } => self.on_pointer_move(layout, position),
            PointerEvent::Up { position } => self.on_pointer_up(position),
        }
    }

    pub fn on_pointer_down(
        &mut self,
        layout: &mut DeskLayout,
        position: Point,
        button: PointerButton,
    ) -> Vec<ControllerAction> {
        let target = self.hit(layout, position);
        self.press(layout, target, position, button)
    }

    /// Press on an already-resolved target, for hosts that do their own hit testing.
    pub fn press(
        &mut self,
        layout: &mut DeskLayout,
        target: PointerTarget,
        position: Point,
        button: PointerButton,
    ) -> Vec<ControllerAction> {
        if !self.state.is_idle() {
            return Vec::new();
        }

        match (button, target) {
            (PointerButton::Secondary, PointerTarget::Seat(seat)) => {
                match layout.rotate_seat(seat) {
                    Ok(_) => vec![ControllerAction::Render, ControllerAction::Persist],
                    Err(_) => Vec::new(),
                }
            }
            (PointerButton::Primary, PointerTarget::Seat(seat)) if layout.seat(seat).is_some() => {
                self.state = InteractionState::DraggingSeat {
                    seat,
                    last: position,
                };
                Vec::new()
            }
            (PointerButton::Primary, PointerTarget::Handle(handle)) => {
                self.state = InteractionState::Resizing {
                    handle,
                    last: position,
                };
                Vec::new()
            }
            (PointerButton::Primary, PointerTarget::Table) if self.settings.table_drag => {
                self.state = InteractionState::DraggingTable { last: position };
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    pub fn on_pointer_move(&mut self, layout: &mut DeskLayout, position: Point) -> Vec<ControllerAction> {
        match self.state {
            InteractionState::Idle => Vec::new(),
            InteractionState::DraggingSeat { seat, last } => {
                let delta = position - last;
                if layout.translate_seat(seat, delta).is_err() {
                    self.state = InteractionState::Idle;
                    return Vec::new();
                }
                self.state = InteractionState::DraggingSeat {
                    seat,
                    last: position,
                };
                vec![ControllerAction::Render]
            }
            InteractionState::DraggingTable { last } => {
                self.table_offset = self.table_offset + (position - last);
                self.state = InteractionState::DraggingTable { last: position };
                vec![ControllerAction::Render]
            }
            InteractionState::Resizing { handle, last } => {
                let delta = position - last;
                let (old_width, old_length) = (layout.table_width(), layout.table_length());
                let width = if handle.is_left() {
                    old_width.saturating_sub(delta.dx)
                } else {
                    old_width.saturating_add(delta.dx)
                };
                let length = if handle.is_top() {
                    old_length.saturating_sub(delta.dy)
                } else {
                    old_length.saturating_add(delta.dy)
                };
                let (new_width, new_length) = layout.resize_table(width, length);
                if handle.is_left() {
                    self.table_offset.x = self
                        .table_offset
                        .x
                        .saturating_add(old_width.saturating_sub(new_width));
                }
                if handle.is_top() {
                    self.table_offset.y = self
                        .table_offset
                        .y
                        .saturating_add(old_length.saturating_sub(new_length));
                }
                self.state = InteractionState::Resizing {
                    handle,
                    last: position,
                };
                vec![ControllerAction::Render]
            }
        }
    }

    /// End whatever gesture is open, keeping its last applied position, and
    /// return the state that was active. Used when the view goes away mid-drag.
    pub fn reset(&mut self) -> InteractionState {
        std::mem::take(&mut self.state)
    }

    /// Release always commits; there is no cancel.
    pub fn on_pointer_up(&mut self, _position: Point) -> Vec<ControllerAction> {
        let previous = std::mem::take(&mut self.state);
        if previous.is_idle() {
            Vec::new()
        } else {
            vec![ControllerAction::Render, ControllerAction::Persist]
        }
    }
}
