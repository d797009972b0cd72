use serde_json::Value;
use thiserror::Error;

use crate::model::{DeskLayout, SeatId, Timestamp};

/// One validated occupancy reading.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    pub id: SeatId,
    pub is_occupied: bool,
    pub signal_strength: Option<f64>,
    pub battery_level: Option<f64>,
}

impl TelemetryRecord {
    pub fn new(id: SeatId, is_occupied: bool) -> Self {
        Self {
            id,
            is_occupied,
            signal_strength: None,
            battery_level: None,
        }
    }

    pub fn with_signal(mut self, signal_strength: f64) -> Self {
        self.signal_strength = Some(signal_strength);
        self
    }

    pub fn with_battery(mut self, battery_level: f64) -> Self {
        self.battery_level = Some(battery_level);
        self
    }
}

/// A payload that passed validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryBatch {
    pub records: Vec<TelemetryRecord>,
}

/// Why a payload was discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelemetryRejection {
    #[error("payload is not valid JSON")]
    NotJson,
    #[error("payload has no `seats` array")]
    MissingSeats,
    #[error("record {0} is malformed")]
    MalformedRecord(usize),
    #[error("record {0} has a reading outside 0..=100")]
    OutOfRange(usize),
}

/// Validate a raw message. Any bad record discards the whole payload.
pub fn parse_payload(raw: &str) -> Result<TelemetryBatch, TelemetryRejection> {
    let value: Value = serde_json::from_str(raw).map_err(|_| TelemetryRejection::NotJson)?;
    parse_value(&value)
}

pub fn parse_value(value: &Value) -> Result<TelemetryBatch, TelemetryRejection> {
    let seats = value
        .get("seats")
        .and_then(Value::as_array)
        .ok_or(TelemetryRejection::MissingSeats)?;

    let records = seats
        .iter()
        .enumerate()
        .map(|(idx, item)| parse_record(idx, item))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TelemetryBatch { records })
}

fn parse_record(idx: usize, item: &Value) -> Result<TelemetryRecord, TelemetryRejection> {
    let map = item
        .as_object()
        .ok_or(TelemetryRejection::MalformedRecord(idx))?;
    let id = map
        .get("id")
        .and_then(Value::as_u64)
        .and_then(|id| SeatId::try_from(id).ok())
        .ok_or(TelemetryRejection::MalformedRecord(idx))?;
    let is_occupied = map
        .get("isOccupied")
        .and_then(Value::as_bool)
        .ok_or(TelemetryRejection::MalformedRecord(idx))?;

    Ok(TelemetryRecord {
        id,
        is_occupied,
        signal_strength: reading(idx, map.get("signalStrength"))?,
        battery_level: reading(idx, map.get("batteryLevel"))?,
    })
}

fn reading(idx: usize, value: Option<&Value>) -> Result<Option<f64>, TelemetryRejection> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let number = value
                .as_f64()
                .ok_or(TelemetryRejection::MalformedRecord(idx))?;
            if (0.0..=100.0).contains(&number) {
                Ok(Some(number))
            } else {
                Err(TelemetryRejection::OutOfRange(idx))
            }
        }
    }
}

/// Outcome of merging one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub updated: Vec<SeatId>,
    /// Record ids with no matching seat; they never create seats.
    pub unknown: Vec<SeatId>,
}

/// Merge a batch into the layout by seat id. Only occupancy and telemetry
/// fields change; seats without a record are left alone.
pub fn merge(layout: &mut DeskLayout, batch: &TelemetryBatch, now: Timestamp) -> MergeReport {
    let mut report = MergeReport::default();
    for record in &batch.records {
        let applied = layout.record_telemetry(
            record.id,
            record.is_occupied,
            record.signal_strength,
            record.battery_level,
            now,
        );
        if applied {
            report.updated.push(record.id);
        } else {
            report.unknown.push(record.id);
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeskConfig;
    use crate::geometry::Point;

    fn two_seats() -> DeskLayout {
        let config = DeskConfig {
            default_seats: vec![Point::new(10, 10), Point::new(20, 20)],
            ..DeskConfig::default()
        };
        DeskLayout::with_defaults(&config)
    }

    #[test]
    fn merge_is_partial_and_non_destructive() {
        let mut layout = two_seats();
        let seat_two_before = layout.seat(2).unwrap().clone();
        let batch = parse_payload(r#"{"seats":[{"id":1,"isOccupied":true,"signalStrength":80}]}"#)
            .unwrap();
        let report = merge(&mut layout, &batch, 1_000);
        assert_eq!(report.updated, vec![1]);

        let seat = layout.seat(1).unwrap();
        assert!(seat.is_occupied);
        assert_eq!(seat.signal_strength, Some(80.0));
        assert_eq!(seat.battery_level, None);
        assert_eq!(seat.position, Point::new(10, 10));
        assert_eq!(seat.last_update, Some(1_000));
        assert_eq!(layout.seat(2).unwrap(), &seat_two_before);
    }

    #[test]
    fn unknown_ids_never_create_seats() {
        let mut layout = two_seats();
        let batch = TelemetryBatch {
            records: vec![TelemetryRecord::new(9, true)],
        };
        let report = merge(&mut layout, &batch, 5);
        assert_eq!(report.unknown, vec![9]);
        assert_eq!(layout.seat_ids(), vec![1, 2]);
    }

    #[test]
    fn absent_readings_keep_previous_values() {
        let mut layout = two_seats();
        let first = TelemetryBatch {
            records: vec![TelemetryRecord::new(1, true).with_signal(40.0).with_battery(90.0)],
        };
        merge(&mut layout, &first, 1);
        let second = TelemetryBatch {
            records: vec![TelemetryRecord::new(1, false).with_battery(15.5)],
        };
        merge(&mut layout, &second, 2);
        let seat = layout.seat(1).unwrap();
        assert!(!seat.is_occupied);
        assert_eq!(seat.signal_strength, Some(40.0));
        assert_eq!(seat.battery_level, Some(15.5));
        assert_eq!(seat.last_update, Some(2));
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert_eq!(parse_payload("nope"), Err(TelemetryRejection::NotJson));
        assert_eq!(
            parse_payload(r#"{"desks":[]}"#),
            Err(TelemetryRejection::MissingSeats)
        );
        assert_eq!(
            parse_payload(r#"{"seats":{"id":1}}"#),
            Err(TelemetryRejection::MissingSeats)
        );
        assert_eq!(
            parse_payload(r#"{"seats":[{"id":1,"isOccupied":true},{"id":"2","isOccupied":true}]}"#),
            Err(TelemetryRejection::MalformedRecord(1))
        );
        assert_eq!(
            parse_payload(r#"{"seats":[{"id":1,"isOccupied":"yes"}]}"#),
            Err(TelemetryRejection::MalformedRecord(0))
        );
        assert_eq!(
            parse_payload(r#"{"seats":[{"id":1,"isOccupied":true,"batteryLevel":140}]}"#),
            Err(TelemetryRejection::OutOfRange(0))
        );
    }

    #[test]
    fn null_readings_are_treated_as_absent() {
        let batch =
            parse_payload(r#"{"seats":[{"id":3,"isOccupied":false,"signalStrength":null}]}"#)
                .unwrap();
        assert_eq!(batch.records, vec![TelemetryRecord::new(3, false)]);
    }

    #[test]
    fn empty_seat_list_is_valid() {
        let batch = parse_payload(r#"{"seats":[]}"#).unwrap();
        assert!(batch.records.is_empty());
    }
}
