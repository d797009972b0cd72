use thiserror::Error;

use crate::model::SeatId;

/// Unified result type for the desk layout crate.
pub type Result<T> = std::result::Result<T, DeskError>;

/// Errors surfaced by the desk layout core.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error("seat {0} not found")]
    SeatNotFound(SeatId),
    #[error("invalid seat style: width {width} x height {height}")]
    InvalidStyle { width: i32, height: i32 },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("terminal backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
