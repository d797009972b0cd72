//! Telemetry ingestion: validate externally pushed occupancy payloads and
//! merge them into existing seats by id.

mod channel;
mod core;
mod simulator;

pub use channel::{TelemetryChannel, TelemetrySender};
pub use self::core::{
    MergeReport, TelemetryBatch, TelemetryRecord, TelemetryRejection, merge, parse_payload,
    parse_value,
};
pub use simulator::OccupancySimulator;
