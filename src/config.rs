//! Single configuration object for the desk view.
//!
//! Every field has a default so a partial JSON document (or none at all) is
//! enough to bring up a working layout.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};
use crate::geometry::Point;
use crate::model::{SeatStyle, TableLimits, TableOrientation, TableShape};

pub const DEFAULT_STORAGE_KEY: &str = "deskLayout";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeskConfig {
    pub table_width: i32,
    pub table_length: i32,
    pub limits: TableLimits,
    pub table_shape: TableShape,
    pub table_orientation: TableOrientation,
    pub table_color: String,
    pub seat_style: SeatStyle,
    /// Positions of the seats created by the default initializer; ids are 1-based in order.
    pub default_seats: Vec<Point>,
    /// Where `add_seat` places a seat when the layout has none.
    pub first_seat_position: Point,
    pub storage_key: String,
    pub telemetry_interval_ms: u64,
    pub simulate_telemetry: bool,
    pub low_battery_threshold: f64,
    /// Side of the square hot zone centred on each table corner.
    pub handle_size: i32,
    pub table_drag: bool,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            table_width: 800,
            table_length: 600,
            limits: TableLimits::default(),
            table_shape: TableShape::Rectangle,
            table_orientation: TableOrientation::default(),
            table_color: "#8b5a2b".to_string(),
            seat_style: SeatStyle::default(),
            default_seats: vec![
                Point::new(100, 50),
                Point::new(640, 50),
                Point::new(100, 490),
                Point::new(640, 490),
            ],
            first_seat_position: Point::new(50, 50),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            telemetry_interval_ms: 5000,
            simulate_telemetry: false,
            low_battery_threshold: 20.0,
            handle_size: 12,
            table_drag: true,
        }
    }
}

impl DeskConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.limits.is_valid() {
            return Err(DeskError::Config(format!(
                "table limits must be positive and ordered: {:?}",
                self.limits
            )));
        }
        if self.table_width < 1 || self.table_length < 1 {
            return Err(DeskError::Config(format!(
                "table size must be positive: {}x{}",
                self.table_width, self.table_length
            )));
        }
        if !self.seat_style.is_valid() {
            return Err(DeskError::InvalidStyle {
                width: self.seat_style.width,
                height: self.seat_style.height,
            });
        }
        if self.storage_key.trim().is_empty() {
            return Err(DeskError::Config("storage key must not be empty".into()));
        }
        if self.handle_size < 1 {
            return Err(DeskError::Config("handle size must be positive".into()));
        }
        Ok(())
    }

    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DeskConfig::default();
        config.validate().unwrap();
        assert_eq!(config.default_seats.len(), 4);
        assert_eq!(config.telemetry_interval(), Duration::from_millis(5000));
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config =
            DeskConfig::from_json_str(r#"{"tableShape":"oval","seatStyle":{"width":40,"height":30,"color":"red"}}"#)
                .unwrap();
        assert_eq!(config.table_shape, TableShape::Oval);
        assert_eq!(config.seat_style.width, 40);
        assert_eq!(config.table_width, 800);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn invalid_limits_are_rejected() {
        let err = DeskConfig::from_json_str(r#"{"limits":{"minWidth":0}}"#).unwrap_err();
        assert!(matches!(err, DeskError::Config(_)));
    }

    #[test]
    fn negative_seat_style_is_rejected() {
        let err =
            DeskConfig::from_json_str(r#"{"seatStyle":{"width":-1,"height":10,"color":"x"}}"#)
                .unwrap_err();
        assert!(matches!(err, DeskError::InvalidStyle { .. }));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desk.json");
        std::fs::write(&path, r#"{"tableWidth":1000,"telemetryIntervalMs":250}"#).unwrap();
        let config = DeskConfig::from_path(&path).unwrap();
        assert_eq!(config.table_width, 1000);
        assert_eq!(config.telemetry_interval_ms, 250);
    }
}
