//! Geometry model: the table, its seats and the mutation surface over them.
//!
//! Downstream modules import model types from here while the layout itself
//! lives in the private `core` module.

mod core;
mod seat;
mod table;

pub use self::core::{DeskLayout, now_ms};
pub(crate) use self::core::sanitize_name;
pub use seat::{Rotation, Seat, SeatId, SeatStyle, Timestamp, default_seat_name};
pub use table::{TableLimits, TableOrientation, TableShape};
