use serde::{Deserialize, Serialize};

use crate::geometry::{Footprint, Point};

/// Seat identity, unique within a layout and never reused in a session.
pub type SeatId = u32;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Quarter-turn seat orientation. Serialized as integer degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Advance by 90 degrees, wrapping at 360.
    pub fn rotated(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }
}

impl TryFrom<i64> for Rotation {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_degrees(value).ok_or_else(|| format!("rotation {value} is not a quarter turn"))
    }
}

impl From<Rotation> for i64 {
    fn from(value: Rotation) -> Self {
        i64::from(value.degrees())
    }
}

/// Seat footprint and colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatStyle {
    pub width: i32,
    pub height: i32,
    pub color: String,
}

impl SeatStyle {
    pub fn new(width: i32, height: i32, color: impl Into<String>) -> Self {
        Self {
            width,
            height,
            color: color.into(),
        }
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.width, self.height)
    }

    pub fn is_valid(&self) -> bool {
        self.width >= 0 && self.height >= 0
    }
}

impl Default for SeatStyle {
    fn default() -> Self {
        Self::new(60, 60, "#4a90e2")
    }
}

/// A seat placed on the table plus the telemetry last merged into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: SeatId,
    pub name: String,
    pub position: Point,
    pub rotation: Rotation,
    pub is_occupied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<SeatStyle>,
}

impl Seat {
    pub(crate) fn new(id: SeatId, position: Point) -> Self {
        Self {
            id,
            name: default_seat_name(id),
            position,
            rotation: Rotation::Deg0,
            is_occupied: false,
            signal_strength: None,
            battery_level: None,
            last_update: None,
            style: None,
        }
    }

    /// Effective footprint: the seat's own override, else the layout default.
    pub fn footprint(&self, default_style: &SeatStyle) -> Footprint {
        self.style
            .as_ref()
            .unwrap_or(default_style)
            .footprint()
    }

    pub fn color<'a>(&'a self, default_style: &'a SeatStyle) -> &'a str {
        self.style.as_ref().unwrap_or(default_style).color.as_str()
    }
}

pub fn default_seat_name(id: SeatId) -> String {
    format!("Seat {id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_rotations_return_to_start() {
        let mut rotation = Rotation::Deg90;
        for _ in 0..4 {
            rotation = rotation.rotated();
        }
        assert_eq!(rotation, Rotation::Deg90);
        assert_eq!(Rotation::Deg270.rotated(), Rotation::Deg0);
    }

    #[test]
    fn rotation_serializes_as_degrees() {
        assert_eq!(serde_json::to_string(&Rotation::Deg180).unwrap(), "180");
        let parsed: Rotation = serde_json::from_str("270").unwrap();
        assert_eq!(parsed, Rotation::Deg270);
        assert!(serde_json::from_str::<Rotation>("45").is_err());
    }

    #[test]
    fn seat_override_wins_over_default_style() {
        let default_style = SeatStyle::default();
        let mut seat = Seat::new(1, Point::origin());
        assert_eq!(seat.footprint(&default_style), Footprint::new(60, 60));
        seat.style = Some(SeatStyle::new(80, 40, "#ff0000"));
        assert_eq!(seat.footprint(&default_style), Footprint::new(80, 40));
        assert_eq!(seat.color(&default_style), "#ff0000");
        assert_eq!(seat.name, "Seat 1");
    }
}
