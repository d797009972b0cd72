//! Error module orchestrator.
//!
//! The crate-wide error enum lives in `types`; callers import it from here or
//! from the crate root.

mod types;

pub use types::{DeskError, Result};
