use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct DeskMetrics {
    events: u64,
    pointer_moves: u64,
    gestures_settled: u64,
    saves_written: u64,
    saves_skipped: u64,
    saves_failed: u64,
    telemetry_merged: u64,
    telemetry_discarded: u64,
}

impl DeskMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&mut self) {
        self.events = self.events.saturating_add(1);
    }

    pub fn record_pointer_move(&mut self) {
        self.pointer_moves = self.pointer_moves.saturating_add(1);
    }

    pub fn record_settle(&mut self) {
        self.gestures_settled = self.gestures_settled.saturating_add(1);
    }

    pub fn record_save(&mut self, written: bool) {
        if written {
            self.saves_written = self.saves_written.saturating_add(1);
        } else {
            self.saves_skipped = self.saves_skipped.saturating_add(1);
        }
    }

    pub fn record_save_failure(&mut self) {
        self.saves_failed = self.saves_failed.saturating_add(1);
    }

    pub fn record_telemetry(&mut self, merged: bool) {
        if merged {
            self.telemetry_merged = self.telemetry_merged.saturating_add(1);
        } else {
            self.telemetry_discarded = self.telemetry_discarded.saturating_add(1);
        }
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            events: self.events,
            pointer_moves: self.pointer_moves,
            gestures_settled: self.gestures_settled,
            saves_written: self.saves_written,
            saves_skipped: self.saves_skipped,
            saves_failed: self.saves_failed,
            telemetry_merged: self.telemetry_merged,
            telemetry_discarded: self.telemetry_discarded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub events: u64,
    pub pointer_moves: u64,
    pub gestures_settled: u64,
    pub saves_written: u64,
    pub saves_skipped: u64,
    pub saves_failed: u64,
    pub telemetry_merged: u64,
    pub telemetry_discarded: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "desk_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("events".to_string(), json!(self.events));
        map.insert("pointer_moves".to_string(), json!(self.pointer_moves));
        map.insert("gestures_settled".to_string(), json!(self.gestures_settled));
        map.insert("saves_written".to_string(), json!(self.saves_written));
        map.insert("saves_skipped".to_string(), json!(self.saves_skipped));
        map.insert("saves_failed".to_string(), json!(self.saves_failed));
        map.insert("telemetry_merged".to_string(), json!(self.telemetry_merged));
        map.insert(
            "telemetry_discarded".to_string(),
            json!(self.telemetry_discarded),
        );
        map
    }
}
