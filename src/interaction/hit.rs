use crate::geometry::{Point, Rect};
use crate::model::{DeskLayout, SeatId};

/// Table corner grabbed during a resize gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::BottomRight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|handle| handle.as_str() == raw)
    }

    /// Handles on the left edge grow the table on negative x deltas.
    pub fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    /// Handles on the top edge grow the table on negative y deltas.
    pub fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    fn corner(self, table: Rect) -> Point {
        match self {
            Self::TopLeft => Point::new(table.x, table.y),
            Self::TopRight => Point::new(table.right(), table.y),
            Self::BottomLeft => Point::new(table.x, table.bottom()),
            Self::BottomRight => Point::new(table.right(), table.bottom()),
        }
    }
}

/// What sits under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Seat(SeatId),
    Handle(ResizeHandle),
    Table,
    Outside,
}

/// The table's rectangle in view coordinates.
pub fn table_rect(layout: &DeskLayout, table_offset: Point) -> Rect {
    Rect::new(
        table_offset.x,
        table_offset.y,
        layout.table_width(),
        layout.table_length(),
    )
}

pub fn handle_rect(handle: ResizeHandle, table: Rect, handle_size: i32) -> Rect {
    Rect::centered(handle.corner(table), handle_size)
}

/// Resolve `pointer` (view coordinates). Handles win over seats, seats over
/// the table surface, and later seats over earlier ones.
pub fn hit_test(
    layout: &DeskLayout,
    table_offset: Point,
    pointer: Point,
    handle_size: i32,
) -> PointerTarget {
    let table = table_rect(layout, table_offset);

    if let Some(handle) = ResizeHandle::ALL
        .into_iter()
        .find(|handle| handle_rect(*handle, table, handle_size).contains(pointer))
    {
        return PointerTarget::Handle(handle);
    }

    let default_style = layout.seat_style();
    for seat in layout.seats().iter().rev() {
        let footprint = seat.footprint(default_style);
        let rect = Rect::new(
            table.x.saturating_add(seat.position.x),
            table.y.saturating_add(seat.position.y),
            footprint.width,
            footprint.height,
        );
        if rect.contains(pointer) {
            return PointerTarget::Seat(seat.id);
        }
    }

    if table.contains(pointer) {
        PointerTarget::Table
    } else {
        PointerTarget::Outside
    }
}
