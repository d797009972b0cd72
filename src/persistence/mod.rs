//! Persistence adapter: a single named record in a key-value store, loaded at
//! startup and rewritten whenever a mutation settles.

mod core;
mod record;
mod store;

pub use self::core::{LayoutPersistence, LoadSource, SaveOutcome};
pub use record::{PersistedLayout, PersistedSeat};
pub use store::{FileStore, KeyValueStore, MemoryStore};
