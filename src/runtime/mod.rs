use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent};
use serde_json::json;

use crate::config::DeskConfig;
use crate::interaction::{
    ControllerAction, ControllerSettings, InteractionController, PointerEvent,
};
use crate::logging::{FileSink, LogLevel, Logger, LoggingResult, emit, json_kv};
use crate::metrics::DeskMetrics;
use crate::model::{
    DeskLayout, SeatId, SeatStyle, TableOrientation, TableShape, now_ms,
};
use crate::persistence::{KeyValueStore, LayoutPersistence, LoadSource, SaveOutcome};
use crate::presentation::{NullPresenter, Presenter, ViewSnapshot};
use crate::telemetry::{OccupancySimulator, TelemetryChannel, TelemetrySender, merge, parse_payload};
use crate::error::Result;

pub mod driver;
pub mod input;
pub mod listeners;
pub mod timer;

use input::{MouseScale, map_key, map_mouse};
use listeners::{BoundListeners, ListenerKind, ListenerRegistry};
use timer::TelemetryTimer;

const TARGET: &str = "desk::runtime";

/// Configuration knobs for the runtime loop.
#[derive(Clone)]
pub struct RuntimeConfig {
    /// Interval between synthetic tick events in the live loop.
    pub tick_interval: Duration,
    /// Optional structured logger used by the runtime and persistence.
    pub logger: Option<Logger>,
    /// Metrics accumulator used for periodic snapshots.
    pub metrics: Option<Arc<Mutex<DeskMetrics>>>,
    /// Interval between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_interval: Duration,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
    /// Pixel size of a terminal cell for mouse mapping.
    pub mouse_scale: MouseScale,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(200),
            logger: None,
            metrics: None,
            metrics_interval: Duration::from_secs(5),
            metrics_target: "desk::runtime.metrics".to_string(),
            mouse_scale: MouseScale::default(),
        }
    }
}

impl RuntimeConfig {
    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(DeskMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<DeskMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }

    /// Log JSON lines to `path`, rotating at `max_bytes`. The terminal host
    /// owns stdout, so this is where its diagnostics go.
    pub fn with_log_file(mut self, path: impl AsRef<Path>, max_bytes: u64) -> LoggingResult<Self> {
        self.logger = Some(Logger::new(FileSink::new(path, max_bytes)?));
        Ok(self)
    }
}

/// Operator actions that are not pointer gestures.
#[derive(Debug, Clone, PartialEq)]
pub enum DeskCommand {
    AddSeat,
    ToggleSeat(SeatId),
    RotateSeat(SeatId),
    RenameSeat { id: SeatId, name: String },
    SetSeatStyle { id: SeatId, style: Option<SeatStyle> },
    SetDefaultSeatStyle(SeatStyle),
    SetTableShape(TableShape),
    CycleTableShape,
    SetTableOrientation(TableOrientation),
    SetTableColor(String),
    Exit,
}

/// Everything the view reacts to.
#[derive(Debug, Clone)]
pub enum DeskEvent {
    Pointer(PointerEvent),
    Command(DeskCommand),
    /// Raw telemetry message as received from another context.
    Telemetry(String),
    Tick { elapsed: Duration },
    Key(KeyEvent),
    Mouse(MouseEvent),
}

/// Owns the layout for the lifetime of a view and routes every mutation.
pub struct DeskRuntime {
    desk: DeskConfig,
    layout: DeskLayout,
    controller: InteractionController,
    persistence: LayoutPersistence,
    load_source: LoadSource,
    telemetry: TelemetryChannel,
    simulator: Option<OccupancySimulator>,
    timer: TelemetryTimer,
    listeners: ListenerRegistry,
    bound: BoundListeners,
    presenter: Box<dyn Presenter>,
    config: RuntimeConfig,
    mounted: bool,
    should_exit: bool,
    redraw_requested: bool,
    start_instant: Option<Instant>,
    last_metrics_emit: Option<Instant>,
}

impl DeskRuntime {
    /// Validate `desk`, load the stored layout (or defaults) and bind listeners.
    pub fn new<S>(desk: DeskConfig, store: S, config: RuntimeConfig) -> Result<Self>
    where
        S: KeyValueStore + 'static,
    {
        desk.validate()?;
        let mut persistence =
            LayoutPersistence::new(store, desk.storage_key.clone()).with_logger(config.logger.clone());
        let (layout, load_source) = persistence.load(&desk);
        let mut listeners = ListenerRegistry::new();
        let bound = BoundListeners::bind(&mut listeners);
        let simulator = desk.simulate_telemetry.then(OccupancySimulator::new);

        Ok(Self {
            controller: InteractionController::new(ControllerSettings::from(&desk)),
            timer: TelemetryTimer::new(desk.telemetry_interval()),
            desk,
            layout,
            persistence,
            load_source,
            telemetry: TelemetryChannel::new(),
            simulator,
            listeners,
            bound,
            presenter: Box::new(NullPresenter),
            config,
            mounted: false,
            should_exit: false,
            redraw_requested: true,
            start_instant: None,
            last_metrics_emit: None,
        })
    }

    pub fn config_mut(&mut self) -> &mut RuntimeConfig {
        &mut self.config
    }

    pub fn set_presenter<P>(&mut self, presenter: P)
    where
        P: Presenter + 'static,
    {
        self.presenter = Box::new(presenter);
        self.redraw_requested = true;
    }

    /// Replace the telemetry source, e.g. with a seeded simulator.
    pub fn set_simulator(&mut self, simulator: Option<OccupancySimulator>) {
        self.simulator = simulator;
    }

    pub fn layout(&self) -> &DeskLayout {
        &self.layout
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn load_source(&self) -> &LoadSource {
        &self.load_source
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot::capture(&self.layout, &self.controller, self.desk.low_battery_threshold)
    }

    /// Handle for other contexts to push telemetry payloads.
    pub fn telemetry_sender(&self) -> TelemetrySender {
        self.telemetry.sender()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn active_listeners(&self) -> usize {
        self.listeners.active_count()
    }

    pub fn timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn exit_requested(&self) -> bool {
        self.should_exit
    }

    /// Attach the pointer listeners and arm the telemetry timer.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.bound.attach(&mut self.listeners);
        self.timer.arm();
        self.mounted = true;
        self.should_exit = false;
        self.redraw_requested = true;
        self.ensure_metrics_initialized();
        let now = Instant::now();
        self.start_instant = Some(now);
        self.last_metrics_emit = Some(now);
        self.log(
            LogLevel::Info,
            "view_mounted",
            [
                json_kv("seats", json!(self.layout.seats().len())),
                json_kv("listeners", json!(self.listeners.active_count())),
            ],
        );
    }

    /// Detach listeners, disarm the timer, end any open gesture where it
    /// stands and flush the layout.
    pub fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.bound.detach(&mut self.listeners);
        self.timer.disarm();
        self.mounted = false;
        let interrupted = self.controller.reset();
        if !interrupted.is_idle() {
            self.log(
                LogLevel::Debug,
                "gesture_interrupted",
                [json_kv("state", json!(interrupted.name()))],
            );
        }
        self.flush();
        let uptime_ms = self
            .start_instant
            .map(|start| start.elapsed().as_millis())
            .unwrap_or(0);
        self.log(
            LogLevel::Info,
            "view_torn_down",
            [
                json_kv("uptime_ms", json!(uptime_ms)),
                json_kv("listeners", json!(self.listeners.active_count())),
            ],
        );
    }

    /// Dispatch one event and re-render if anything changed.
    pub fn process(&mut self, event: DeskEvent) -> Result<()> {
        self.dispatch(event);
        self.render_if_needed()?;
        self.maybe_emit_metrics();
        Ok(())
    }

    pub fn run_scripted<I>(&mut self, events: I) -> Result<()>
    where
        I: IntoIterator<Item = DeskEvent>,
    {
        self.mount();
        self.render_if_needed()?;
        for event in events {
            self.process(event)?;
            if self.should_exit {
                break;
            }
        }
        self.teardown();
        Ok(())
    }

    /// Live loop over terminal input. Expects the terminal to already be in
    /// raw mode with mouse capture (see [`driver::cli::CliDriver`]).
    pub fn run(&mut self) -> Result<()> {
        self.mount();
        self.render_if_needed()?;
        let mut last_tick = Instant::now();

        while !self.should_exit {
            let timeout = self
                .config
                .tick_interval
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::ZERO);

            if event::poll(timeout)? {
                let event = match event::read()? {
                    CrosstermEvent::Mouse(mouse) => Some(DeskEvent::Mouse(mouse)),
                    CrosstermEvent::Key(key) => Some(DeskEvent::Key(key)),
                    CrosstermEvent::Resize(_, _) => {
                        self.redraw_requested = true;
                        None
                    }
                    _ => None,
                };
                if let Some(event) = event {
                    self.process(event)?;
                } else {
                    self.render_if_needed()?;
                }
            }

            if last_tick.elapsed() >= self.config.tick_interval {
                let now = Instant::now();
                let elapsed = now.duration_since(last_tick);
                last_tick = now;
                self.process(DeskEvent::Tick { elapsed })?;
            }
        }

        self.teardown();
        Ok(())
    }

    fn dispatch(&mut self, event: DeskEvent) {
        self.with_metrics(DeskMetrics::record_event);
        let kind = describe_event(&event);
        match event {
            DeskEvent::Pointer(pointer) => self.handle_pointer(pointer),
            DeskEvent::Mouse(mouse) => {
                if let Some(pointer) = map_mouse(&mouse, self.config.mouse_scale) {
                    self.handle_pointer(pointer);
                }
            }
            DeskEvent::Key(key) => {
                if let Some(command) = map_key(&key) {
                    self.handle_command(command);
                }
            }
            DeskEvent::Command(command) => self.handle_command(command),
            DeskEvent::Telemetry(raw) => self.ingest(&raw),
            DeskEvent::Tick { elapsed } => self.on_tick(elapsed),
        }
        self.log(
            LogLevel::Trace,
            "event_dispatched",
            [
                json_kv("event", json!(kind)),
                json_kv("state", json!(self.controller.state().name())),
            ],
        );
    }

    fn handle_pointer(&mut self, pointer: PointerEvent) {
        let listening = match pointer {
            PointerEvent::Down { .. } => self.mounted,
            PointerEvent::Move { .. } => self.listeners.is_listening(ListenerKind::PointerMove),
            PointerEvent::Up { .. } => self.listeners.is_listening(ListenerKind::PointerUp),
        };
        if !listening {
            return;
        }
        if matches!(pointer, PointerEvent::Move { .. }) {
            self.with_metrics(DeskMetrics::record_pointer_move);
        }
        let actions = self.controller.handle(&mut self.layout, pointer);
        self.apply_actions(&actions);
    }

    fn apply_actions(&mut self, actions: &[ControllerAction]) {
        for action in actions {
            match action {
                ControllerAction::Render => self.redraw_requested = true,
                ControllerAction::Persist => {
                    self.with_metrics(DeskMetrics::record_settle);
                    self.flush();
                }
            }
        }
    }

    fn handle_command(&mut self, command: DeskCommand) {
        let outcome: Result<bool> = match &command {
            DeskCommand::AddSeat => {
                let id = self.layout.add_seat();
                self.log(LogLevel::Info, "seat_added", [json_kv("seat", json!(id))]);
                Ok(true)
            }
            DeskCommand::ToggleSeat(id) => self.layout.toggle_seat(*id, now_ms()).map(|_| false),
            DeskCommand::RotateSeat(id) => self.layout.rotate_seat(*id).map(|_| true),
            DeskCommand::RenameSeat { id, name } => self.layout.set_seat_name(*id, name).map(|_| true),
            DeskCommand::SetSeatStyle { id, style } => {
                self.layout.set_seat_style(*id, style.clone()).map(|_| true)
            }
            DeskCommand::SetDefaultSeatStyle(style) => {
                self.layout.set_default_seat_style(style.clone()).map(|_| true)
            }
            DeskCommand::SetTableShape(shape) => {
                self.layout.set_table_shape(*shape);
                Ok(true)
            }
            DeskCommand::CycleTableShape => {
                let next = self.layout.shape().next();
                self.layout.set_table_shape(next);
                Ok(true)
            }
            DeskCommand::SetTableOrientation(orientation) => {
                self.layout.set_table_orientation(*orientation);
                Ok(true)
            }
            DeskCommand::SetTableColor(color) => {
                self.layout.set_table_color(color.clone());
                Ok(true)
            }
            DeskCommand::Exit => {
                self.should_exit = true;
                self.log(
                    LogLevel::Info,
                    "exit_requested",
                    [json_kv("state", json!(self.controller.state().name()))],
                );
                return;
            }
        };

        match outcome {
            Ok(persist) => {
                self.redraw_requested = true;
                if persist && self.controller.state().is_idle() {
                    self.flush();
                } else if persist {
                    // The release that settles the gesture writes this change too.
                    self.log(
                        LogLevel::Debug,
                        "save_deferred",
                        [json_kv("state", json!(self.controller.state().name()))],
                    );
                }
            }
            Err(err) => self.log(
                LogLevel::Warn,
                "command_rejected",
                [
                    json_kv("command", json!(format!("{command:?}"))),
                    json_kv("error", json!(err.to_string())),
                ],
            ),
        }
    }

    fn on_tick(&mut self, elapsed: Duration) {
        if self.timer.advance(elapsed) {
            let ids = self.layout.seat_ids();
            if let Some(simulator) = self.simulator.as_mut() {
                let payload = simulator.next_payload(&ids);
                self.telemetry.sender().post(payload);
            }
        }
        for payload in self.telemetry.drain() {
            self.ingest(&payload);
        }
    }

    fn ingest(&mut self, raw: &str) {
        match parse_payload(raw) {
            Ok(batch) => {
                let report = merge(&mut self.layout, &batch, now_ms());
                self.with_metrics(|m| m.record_telemetry(true));
                self.redraw_requested = true;
                self.log_target(
                    LogLevel::Debug,
                    "desk::telemetry",
                    "telemetry_merged",
                    [
                        json_kv("updated", json!(report.updated.len())),
                        json_kv("unknown", json!(report.unknown)),
                    ],
                );
            }
            Err(rejection) => {
                self.with_metrics(|m| m.record_telemetry(false));
                self.log_target(
                    LogLevel::Warn,
                    "desk::telemetry",
                    "telemetry_discarded",
                    [
                        json_kv("reason", json!(rejection.to_string())),
                        json_kv("bytes", json!(raw.len())),
                    ],
                );
            }
        }
    }

    /// Persist the layout. Storage failures are logged, never raised.
    fn flush(&mut self) {
        match self.persistence.save(&self.layout) {
            Ok(outcome) => {
                self.with_metrics(|m| m.record_save(outcome == SaveOutcome::Written));
            }
            Err(err) => {
                self.with_metrics(DeskMetrics::record_save_failure);
                self.log(
                    LogLevel::Warn,
                    "save_failed",
                    [
                        json_kv("key", json!(self.persistence.key())),
                        json_kv("error", json!(err.to_string())),
                    ],
                );
            }
        }
    }

    fn render_if_needed(&mut self) -> Result<()> {
        if !self.redraw_requested {
            return Ok(());
        }
        self.redraw_requested = false;
        let snapshot = self.snapshot();
        self.presenter.present(&snapshot)
    }

    fn ensure_metrics_initialized(&mut self) {
        if self.config.metrics.is_none() && !self.config.metrics_interval.is_zero() {
            self.config.enable_metrics();
        }
    }

    fn with_metrics(&self, f: impl FnOnce(&mut DeskMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                f(&mut *guard);
            }
        }
    }

    fn maybe_emit_metrics(&mut self) {
        if self.config.metrics.is_none() || self.config.metrics_interval.is_zero() {
            return;
        }

        let now = Instant::now();
        match self.last_metrics_emit {
            Some(last) if now.duration_since(last) < self.config.metrics_interval => return,
            _ => self.last_metrics_emit = Some(now),
        }

        let uptime = self
            .start_instant
            .map(|start| now.duration_since(start))
            .unwrap_or_default();

        if let (Some(logger), Some(metrics)) =
            (self.config.logger.as_ref(), self.config.metrics.as_ref())
        {
            if let Ok(guard) = metrics.lock() {
                let event = guard.snapshot(uptime).to_log_event(&self.config.metrics_target);
                let _ = logger.log_event(event);
            }
        }
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        self.log_target(level, TARGET, message, fields);
    }

    fn log_target<I>(&self, level: LogLevel, target: &str, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        emit(self.config.logger.as_ref(), level, target, message, fields);
    }
}

impl Drop for DeskRuntime {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn describe_event(event: &DeskEvent) -> &'static str {
    match event {
        DeskEvent::Pointer(PointerEvent::Down { .. }) => "pointer_down",
        DeskEvent::Pointer(PointerEvent::Move { .. }) => "pointer_move",
        DeskEvent::Pointer(PointerEvent::Up { .. }) => "pointer_up",
        DeskEvent::Command(_) => "command",
        DeskEvent::Telemetry(_) => "telemetry",
        DeskEvent::Tick { .. } => "tick",
        DeskEvent::Key(_) => "key",
        DeskEvent::Mouse(_) => "mouse",
    }
}
