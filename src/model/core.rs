use std::time::{SystemTime, UNIX_EPOCH};

use crate::bounds::{clamp_dimension, clamp_position};
use crate::config::DeskConfig;
use crate::error::{DeskError, Result};
use crate::geometry::{Delta, Point};

use super::seat::{Seat, SeatId, SeatStyle, Rotation, Timestamp};
use super::table::{TableLimits, TableOrientation, TableShape};

pub fn now_ms() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or(0)
}

/// The full geometric state: table extent, styling hints and every seat.
///
/// Seats are only reachable through shared references; every mutation goes
/// through a method that leaves all seats clamped inside the table.
#[derive(Debug, Clone, PartialEq)]
pub struct DeskLayout {
    seats: Vec<Seat>,
    table_width: i32,
    table_length: i32,
    limits: TableLimits,
    shape: TableShape,
    orientation: TableOrientation,
    table_color: String,
    seat_style: SeatStyle,
    first_seat_position: Point,
    highest_issued: SeatId,
}

impl DeskLayout {
    /// Default initializer: the configured table with seats at fixed positions.
    pub fn with_defaults(config: &DeskConfig) -> Self {
        let mut layout = Self::empty(config);
        for (idx, position) in config.default_seats.iter().enumerate() {
            let id = idx as SeatId + 1;
            layout.seats.push(Seat::new(id, *position));
            layout.highest_issued = id;
        }
        layout.reclamp_all();
        layout
    }

    /// A table from `config` with no seats.
    pub fn empty(config: &DeskConfig) -> Self {
        let limits = config.limits;
        Self {
            seats: Vec::new(),
            table_width: clamp_dimension(config.table_width, limits.min_width, limits.max_width),
            table_length: clamp_dimension(
                config.table_length,
                limits.min_length,
                limits.max_length,
            ),
            limits,
            shape: config.table_shape,
            orientation: config.table_orientation,
            table_color: config.table_color.clone(),
            seat_style: config.seat_style.clone(),
            first_seat_position: config.first_seat_position,
            highest_issued: 0,
        }
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, id: SeatId) -> Option<&Seat> {
        self.seats.iter().find(|seat| seat.id == id)
    }

    pub fn seat_ids(&self) -> Vec<SeatId> {
        self.seats.iter().map(|seat| seat.id).collect()
    }

    pub fn table_width(&self) -> i32 {
        self.table_width
    }

    pub fn table_length(&self) -> i32 {
        self.table_length
    }

    pub fn limits(&self) -> TableLimits {
        self.limits
    }

    pub fn shape(&self) -> TableShape {
        self.shape
    }

    pub fn orientation(&self) -> TableOrientation {
        self.orientation
    }

    pub fn table_color(&self) -> &str {
        &self.table_color
    }

    pub fn seat_style(&self) -> &SeatStyle {
        &self.seat_style
    }

    pub fn occupied_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.is_occupied).count()
    }

    /// Next id: one past the largest id present or ever issued this session.
    pub fn next_seat_id(&self) -> SeatId {
        let max_existing = self.seats.iter().map(|seat| seat.id).max().unwrap_or(0);
        max_existing.max(self.highest_issued) + 1
    }

    /// Append a seat at the table centre (or the configured first position
    /// when the layout is empty) using the layout-wide style.
    pub fn add_seat(&mut self) -> SeatId {
        let id = self.next_seat_id();
        let footprint = self.seat_style.footprint();
        let position = if self.seats.is_empty() {
            self.first_seat_position
        } else {
            Point::new(
                (self.table_width - footprint.width) / 2,
                (self.table_length - footprint.height) / 2,
            )
        };
        let position = clamp_position(position, footprint, self.table_width, self.table_length);
        self.seats.push(Seat::new(id, position));
        self.highest_issued = id;
        id
    }

    /// Move a seat to `position`, clamped. Returns the stored position.
    pub fn set_seat_position(&mut self, id: SeatId, position: Point) -> Result<Point> {
        let (width, length) = (self.table_width, self.table_length);
        let default_style = self.seat_style.clone();
        let seat = self.seat_mut(id)?;
        let clamped = clamp_position(position, seat.footprint(&default_style), width, length);
        seat.position = clamped;
        Ok(clamped)
    }

    pub fn translate_seat(&mut self, id: SeatId, delta: Delta) -> Result<Point> {
        let current = self.seat(id).ok_or(DeskError::SeatNotFound(id))?.position;
        self.set_seat_position(id, current + delta)
    }

    pub fn rotate_seat(&mut self, id: SeatId) -> Result<Rotation> {
        let seat = self.seat_mut(id)?;
        seat.rotation = seat.rotation.rotated();
        Ok(seat.rotation)
    }

    /// Resize the table within its limits and re-clamp every seat.
    /// Returns the applied `(width, length)`.
    pub fn resize_table(&mut self, width: i32, length: i32) -> (i32, i32) {
        self.table_width = clamp_dimension(width, self.limits.min_width, self.limits.max_width);
        self.table_length =
            clamp_dimension(length, self.limits.min_length, self.limits.max_length);
        self.reclamp_all();
        (self.table_width, self.table_length)
    }

    /// Override one seat's style, or clear the override with `None`.
    pub fn set_seat_style(&mut self, id: SeatId, style: Option<SeatStyle>) -> Result<()> {
        if let Some(style) = style.as_ref() {
            ensure_valid_style(style)?;
        }
        self.seat_mut(id)?.style = style;
        self.reclamp_all();
        Ok(())
    }

    /// Replace the layout-wide style inherited by seats without an override.
    pub fn set_default_seat_style(&mut self, style: SeatStyle) -> Result<()> {
        ensure_valid_style(&style)?;
        self.seat_style = style;
        self.reclamp_all();
        Ok(())
    }

    pub fn set_seat_name(&mut self, id: SeatId, name: &str) -> Result<()> {
        let cleaned = sanitize_name(name);
        let seat = self.seat_mut(id)?;
        seat.name = if cleaned.is_empty() {
            super::seat::default_seat_name(id)
        } else {
            cleaned
        };
        Ok(())
    }

    /// Flip occupancy by hand, stamping `last_update`.
    pub fn toggle_seat(&mut self, id: SeatId, now: Timestamp) -> Result<bool> {
        let seat = self.seat_mut(id)?;
        seat.is_occupied = !seat.is_occupied;
        seat.last_update = Some(now);
        Ok(seat.is_occupied)
    }

    pub fn set_table_shape(&mut self, shape: TableShape) {
        self.shape = shape;
    }

    pub fn set_table_orientation(&mut self, orientation: TableOrientation) {
        self.orientation = orientation;
    }

    pub fn set_table_color(&mut self, color: impl Into<String>) {
        self.table_color = color.into();
    }

    /// Overwrite telemetry fields on one seat. Geometry is never touched here.
    pub(crate) fn record_telemetry(
        &mut self,
        id: SeatId,
        is_occupied: bool,
        signal_strength: Option<f64>,
        battery_level: Option<f64>,
        now: Timestamp,
    ) -> bool {
        let Some(seat) = self.seats.iter_mut().find(|seat| seat.id == id) else {
            return false;
        };
        seat.is_occupied = is_occupied;
        if signal_strength.is_some() {
            seat.signal_strength = signal_strength;
        }
        if battery_level.is_some() {
            seat.battery_level = battery_level;
        }
        seat.last_update = Some(now);
        true
    }

    /// Rebuild a layout from persisted parts. Seats are re-clamped and ids
    /// stay unique (later duplicates are dropped).
    pub(crate) fn restore(
        config: &DeskConfig,
        table_width: i32,
        table_length: i32,
        seat_style: SeatStyle,
        seats: Vec<Seat>,
    ) -> Self {
        let mut layout = Self::empty(config);
        layout.table_width =
            clamp_dimension(table_width, layout.limits.min_width, layout.limits.max_width);
        layout.table_length =
            clamp_dimension(table_length, layout.limits.min_length, layout.limits.max_length);
        layout.seat_style = seat_style;
        for seat in seats {
            if layout.seat(seat.id).is_none() {
                layout.highest_issued = layout.highest_issued.max(seat.id);
                layout.seats.push(seat);
            }
        }
        layout.reclamp_all();
        layout
    }

    fn seat_mut(&mut self, id: SeatId) -> Result<&mut Seat> {
        self.seats
            .iter_mut()
            .find(|seat| seat.id == id)
            .ok_or(DeskError::SeatNotFound(id))
    }

    fn reclamp_all(&mut self) {
        let (width, length) = (self.table_width, self.table_length);
        for seat in &mut self.seats {
            let footprint = seat.footprint(&self.seat_style);
            seat.position = clamp_position(seat.position, footprint, width, length);
        }
    }
}

fn ensure_valid_style(style: &SeatStyle) -> Result<()> {
    if style.is_valid() {
        Ok(())
    } else {
        Err(DeskError::InvalidStyle {
            width: style.width,
            height: style.height,
        })
    }
}

/// Strip ANSI escapes and control characters, then trim.
pub(crate) fn sanitize_name(name: &str) -> String {
    let stripped = strip_ansi_escapes::strip(name.as_bytes());
    String::from_utf8_lossy(&stripped)
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}
