use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::DeskConfig;
use crate::geometry::Point;
use crate::model::{
    DeskLayout, Rotation, Seat, SeatId, SeatStyle, TableOrientation, TableShape, sanitize_name,
};

/// Durable form of a layout.
///
/// Reading is field-by-field: a field that is missing or has the wrong shape
/// falls back to its default without invalidating the rest of the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLayout {
    pub seats: Vec<PersistedSeat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_length: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_style: Option<SeatStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_shape: Option<TableShape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_orientation: Option<TableOrientation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSeat {
    pub id: SeatId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Rotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<SeatStyle>,
}

impl PersistedLayout {
    pub fn from_layout(layout: &DeskLayout) -> Self {
        Self {
            seats: layout
                .seats()
                .iter()
                .map(|seat| PersistedSeat {
                    id: seat.id,
                    name: Some(seat.name.clone()),
                    position: Some(seat.position),
                    rotation: Some(seat.rotation),
                    style: seat.style.clone(),
                })
                .collect(),
            table_width: Some(layout.table_width()),
            table_length: Some(layout.table_length()),
            seat_style: Some(layout.seat_style().clone()),
            table_shape: Some(layout.shape()),
            table_orientation: Some(layout.orientation()),
            table_color: Some(layout.table_color().to_string()),
        }
    }

    /// Parse a stored record. Returns `None` when the text is not a JSON object.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(raw).ok()? {
            Value::Object(map) => Some(Self::from_map(&map)),
            _ => None,
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let seats = map
            .get("seats")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(PersistedSeat::from_value).collect())
            .unwrap_or_default();

        Self {
            seats,
            table_width: map.get("tableWidth").and_then(positive_i32),
            table_length: map.get("tableLength").and_then(positive_i32),
            seat_style: map
                .get("seatStyle")
                .and_then(|value| serde_json::from_value::<SeatStyle>(value.clone()).ok())
                .filter(SeatStyle::is_valid),
            table_shape: map
                .get("tableShape")
                .and_then(Value::as_str)
                .and_then(TableShape::parse),
            table_orientation: map
                .get("tableOrientation")
                .and_then(|value| serde_json::from_value(value.clone()).ok()),
            table_color: map
                .get("tableColor")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// Rebuild a layout on top of the default initializer.
    ///
    /// Persisted order wins. Seats that exist in the default set keep their
    /// defaults and take only `position` and `rotation` from the record; other
    /// persisted seats are restored from the record; default seats missing from
    /// the record are appended.
    pub fn into_layout(self, config: &DeskConfig) -> DeskLayout {
        let defaults = DeskLayout::with_defaults(config);
        let mut seats: Vec<Seat> = Vec::with_capacity(self.seats.len());

        for persisted in &self.seats {
            let seat = match defaults.seat(persisted.id) {
                Some(default_seat) => {
                    let mut seat = default_seat.clone();
                    if let Some(position) = persisted.position {
                        seat.position = position;
                    }
                    if let Some(rotation) = persisted.rotation {
                        seat.rotation = rotation;
                    }
                    seat
                }
                None => persisted.to_seat(config.first_seat_position),
            };
            seats.push(seat);
        }

        for default_seat in defaults.seats() {
            if !self.seats.iter().any(|persisted| persisted.id == default_seat.id) {
                seats.push(default_seat.clone());
            }
        }

        let mut layout = DeskLayout::restore(
            config,
            self.table_width.unwrap_or(config.table_width),
            self.table_length.unwrap_or(config.table_length),
            self.seat_style.unwrap_or_else(|| config.seat_style.clone()),
            seats,
        );
        if let Some(shape) = self.table_shape {
            layout.set_table_shape(shape);
        }
        if let Some(orientation) = self.table_orientation {
            layout.set_table_orientation(orientation);
        }
        if let Some(color) = self.table_color {
            layout.set_table_color(color);
        }
        layout
    }
}

impl PersistedSeat {
    fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let id = map
            .get("id")
            .and_then(Value::as_u64)
            .and_then(|id| SeatId::try_from(id).ok())
            .filter(|id| *id > 0)?;

        Some(Self {
            id,
            name: map.get("name").and_then(Value::as_str).map(str::to_string),
            position: map
                .get("position")
                .and_then(|value| serde_json::from_value::<Point>(value.clone()).ok()),
            rotation: map
                .get("rotation")
                .and_then(Value::as_i64)
                .and_then(Rotation::from_degrees),
            style: map
                .get("style")
                .and_then(|value| serde_json::from_value::<SeatStyle>(value.clone()).ok())
                .filter(SeatStyle::is_valid),
        })
    }

    fn to_seat(&self, fallback_position: Point) -> Seat {
        let mut seat = Seat::new(self.id, self.position.unwrap_or(fallback_position));
        let cleaned = self.name.as_deref().map(sanitize_name).unwrap_or_default();
        if !cleaned.is_empty() {
            seat.name = cleaned;
        }
        seat.rotation = self.rotation.unwrap_or_default();
        seat.style = self.style.clone();
        seat
    }
}

fn positive_i32(value: &Value) -> Option<i32> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
        .and_then(|v| i32::try_from(v).ok())
        .filter(|v| *v > 0)
}
