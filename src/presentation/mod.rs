//! Read-only view of the layout for the rendering surface.
//!
//! The snapshot is rebuilt on every state change; renderers never touch the
//! layout directly. [`Presenter`] is the seam to whatever paints it.

use std::io::Write;

use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::error::Result;
use crate::geometry::Point;
use crate::interaction::InteractionController;
use crate::model::{DeskLayout, Seat, SeatId, SeatStyle, TableShape, Timestamp};

pub const MIN_SIGNAL_OPACITY: f64 = 0.2;
pub const DEFAULT_LOW_BATTERY_THRESHOLD: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub width: i32,
    pub length: i32,
    pub shape: TableShape,
    pub color: String,
    pub offset: Point,
    pub transform: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub id: SeatId,
    pub label: String,
    pub position: Point,
    pub rotation: u16,
    pub width: i32,
    pub height: i32,
    pub color: String,
    pub transform: String,
    pub is_occupied: bool,
    pub signal_opacity: f64,
    pub low_battery: bool,
    pub signal_strength: Option<f64>,
    pub battery_level: Option<f64>,
    pub last_update: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub table: TableView,
    pub seats: Vec<SeatView>,
    pub active_seat_count: usize,
    pub interaction: &'static str,
}

impl ViewSnapshot {
    pub fn capture(
        layout: &DeskLayout,
        controller: &InteractionController,
        low_battery_threshold: f64,
    ) -> Self {
        let default_style = layout.seat_style();
        let seats = layout
            .seats()
            .iter()
            .map(|seat| SeatView::from_seat(seat, default_style, low_battery_threshold))
            .collect();

        Self {
            table: TableView {
                width: layout.table_width(),
                length: layout.table_length(),
                shape: layout.shape(),
                color: layout.table_color().to_string(),
                offset: controller.table_offset(),
                transform: layout.orientation().transform(),
            },
            seats,
            active_seat_count: layout.occupied_count(),
            interaction: controller.state().name(),
        }
    }

    pub fn seat(&self, id: SeatId) -> Option<&SeatView> {
        self.seats.iter().find(|seat| seat.id == id)
    }
}

impl SeatView {
    fn from_seat(seat: &Seat, default_style: &SeatStyle, low_battery_threshold: f64) -> Self {
        let footprint = seat.footprint(default_style);
        Self {
            id: seat.id,
            label: seat.name.clone(),
            position: seat.position,
            rotation: seat.rotation.degrees(),
            width: footprint.width,
            height: footprint.height,
            color: seat.color(default_style).to_string(),
            transform: seat_transform(seat),
            is_occupied: seat.is_occupied,
            signal_opacity: signal_opacity(seat.signal_strength),
            low_battery: is_low_battery(seat.battery_level, low_battery_threshold),
            signal_strength: seat.signal_strength,
            battery_level: seat.battery_level,
            last_update: seat.last_update,
        }
    }
}

pub fn seat_transform(seat: &Seat) -> String {
    format!(
        "translate({}px, {}px) rotate({}deg)",
        seat.position.x,
        seat.position.y,
        seat.rotation.degrees()
    )
}

/// Opacity for the signal indicator; full when nothing has been reported.
pub fn signal_opacity(signal_strength: Option<f64>) -> f64 {
    match signal_strength {
        Some(signal) => (signal / 100.0).clamp(MIN_SIGNAL_OPACITY, 1.0),
        None => 1.0,
    }
}

pub fn is_low_battery(battery_level: Option<f64>, threshold: f64) -> bool {
    battery_level.is_some_and(|level| level < threshold)
}

/// Rendering surface fed with a fresh snapshot after each change.
pub trait Presenter {
    fn present(&mut self, snapshot: &ViewSnapshot) -> Result<()>;
}

/// Discards every snapshot.
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _snapshot: &ViewSnapshot) -> Result<()> {
        Ok(())
    }
}

/// Writes a plain-text summary: one header line plus one line per seat.
pub struct TextPresenter<W: Write> {
    writer: W,
    label_width: usize,
}

impl<W: Write> TextPresenter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            label_width: 12,
        }
    }

    pub fn with_label_width(mut self, label_width: usize) -> Self {
        self.label_width = label_width.max(1);
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn present(&mut self, snapshot: &ViewSnapshot) -> Result<()> {
        render_text(&mut self.writer, snapshot, self.label_width)
    }
}

pub fn render_text(writer: &mut impl Write, snapshot: &ViewSnapshot, label_width: usize) -> Result<()> {
    let table = &snapshot.table;
    writeln!(
        writer,
        "table {}x{} {} @({},{}) occupied {}/{} [{}]",
        table.width,
        table.length,
        table.shape.as_str(),
        table.offset.x,
        table.offset.y,
        snapshot.active_seat_count,
        snapshot.seats.len(),
        snapshot.interaction
    )?;
    for seat in &snapshot.seats {
        let label = fit_to_width(&seat.label, label_width);
        let battery = if seat.low_battery { " LOW-BATTERY" } else { "" };
        writeln!(
            writer,
            "  #{:<3} {} ({:>4},{:>4}) {:>3}deg {}{}",
            seat.id,
            label,
            seat.position.x,
            seat.position.y,
            seat.rotation,
            if seat.is_occupied { "occupied" } else { "free" },
            battery
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Truncate or pad `text` to exactly `width` display columns.
pub fn fit_to_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    if UnicodeWidthStr::width(text) > width {
        let budget = width.saturating_sub(1);
        for ch in text.chars() {
            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if used + w > budget {
                break;
            }
            out.push(ch);
            used += w;
        }
        if width > 0 {
            out.push('…');
            used += 1;
        }
    } else {
        out.push_str(text);
        used = UnicodeWidthStr::width(text);
    }
    while used < width {
        out.push(' ');
        used += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeskConfig;
    use crate::interaction::ControllerSettings;
    use crate::telemetry::{TelemetryBatch, TelemetryRecord, merge};

    fn snapshot_with_telemetry() -> ViewSnapshot {
        let mut layout = DeskLayout::with_defaults(&DeskConfig::default());
        layout.rotate_seat(2).unwrap();
        let batch = TelemetryBatch {
            records: vec![
                TelemetryRecord::new(1, true).with_signal(80.0).with_battery(10.0),
                TelemetryRecord::new(2, true).with_signal(5.0).with_battery(20.0),
            ],
        };
        merge(&mut layout, &batch, 99);
        let controller = InteractionController::new(ControllerSettings::default());
        ViewSnapshot::capture(&layout, &controller, DEFAULT_LOW_BATTERY_THRESHOLD)
    }

    #[test]
    fn derived_values_follow_telemetry() {
        let snapshot = snapshot_with_telemetry();
        assert_eq!(snapshot.active_seat_count, 2);
        let one = snapshot.seat(1).unwrap();
        assert!((one.signal_opacity - 0.8).abs() < 1e-9);
        assert!(one.low_battery);
        let two = snapshot.seat(2).unwrap();
        assert!((two.signal_opacity - MIN_SIGNAL_OPACITY).abs() < 1e-9);
        assert!(!two.low_battery);
        let three = snapshot.seat(3).unwrap();
        assert_eq!(three.signal_opacity, 1.0);
        assert!(!three.low_battery);
    }

    #[test]
    fn seat_transform_string() {
        let snapshot = snapshot_with_telemetry();
        assert_eq!(
            snapshot.seat(2).unwrap().transform,
            "translate(640px, 50px) rotate(90deg)"
        );
        assert_eq!(snapshot.interaction, "idle");
        assert_eq!(
            snapshot.table.transform,
            "rotateX(0deg) rotateY(0deg) rotateZ(0deg)"
        );
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let json = serde_json::to_value(snapshot_with_telemetry()).unwrap();
        assert_eq!(json["activeSeatCount"], 2);
        assert_eq!(json["seats"][0]["lowBattery"], true);
        assert_eq!(json["table"]["shape"], "rectangle");
    }

    #[test]
    fn text_presenter_writes_one_line_per_seat() {
        let mut presenter = TextPresenter::new(Vec::new()).with_label_width(6);
        presenter.present(&snapshot_with_telemetry()).unwrap();
        let text = String::from_utf8(presenter.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("table 800x600 rectangle"));
        assert!(lines[1].contains("LOW-BATTERY"));
        assert!(lines[1].contains("Seat 1"));
    }

    #[test]
    fn labels_are_fitted_by_display_width() {
        assert_eq!(fit_to_width("Seat 1", 8), "Seat 1  ");
        assert_eq!(fit_to_width("Window seat", 6), "Windo…");
        assert_eq!(fit_to_width("会議室", 4), "会… ");
        assert_eq!(UnicodeWidthStr::width(fit_to_width("会議室", 4).as_str()), 4);
    }
}
