//! Desk layout state machine.
//!
//! A rectangular table with seats that can be dragged, rotated and resized
//! around, kept inside the table bounds, persisted to a key-value store and
//! updated from occupancy telemetry. The runtime owns one layout per view and
//! routes pointer gestures, commands and telemetry through a single loop.

pub mod bounds;
pub mod config;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod persistence;
pub mod presentation;
pub mod runtime;
pub mod telemetry;

pub use bounds::{clamp_dimension, clamp_position, is_within};
pub use config::{DEFAULT_STORAGE_KEY, DeskConfig};
pub use error::{DeskError, Result};
pub use geometry::{Delta, Footprint, Point, Rect};
pub use interaction::{
    ControllerAction, ControllerSettings, InteractionController, InteractionState, PointerButton,
    PointerEvent, PointerTarget, ResizeHandle,
};
pub use logging::{LogEvent, LogFields, LogLevel, Logger, LoggingError, LoggingResult};
pub use metrics::{DeskMetrics, MetricSnapshot};
pub use model::{
    DeskLayout, Rotation, Seat, SeatId, SeatStyle, TableLimits, TableOrientation, TableShape,
    Timestamp,
};
pub use persistence::{
    FileStore, KeyValueStore, LayoutPersistence, LoadSource, MemoryStore, PersistedLayout,
    SaveOutcome,
};
pub use presentation::{NullPresenter, Presenter, TextPresenter, ViewSnapshot};
pub use runtime::driver::cli::{CliDriver, CliDriverError};
pub use runtime::driver::socket::{JsonDeskStrategy, SocketDriver, SocketDriverError};
pub use runtime::{DeskCommand, DeskEvent, DeskRuntime, RuntimeConfig};
pub use telemetry::{
    OccupancySimulator, TelemetryBatch, TelemetryChannel, TelemetryRecord, TelemetryRejection,
    TelemetrySender,
};
