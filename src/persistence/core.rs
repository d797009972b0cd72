use serde_json::json;

use crate::config::DeskConfig;
use crate::error::Result;
use crate::logging::{LogLevel, Logger, emit, json_kv};
use crate::model::DeskLayout;

use super::record::PersistedLayout;
use super::store::KeyValueStore;

const TARGET: &str = "desk::persistence";

/// Where a loaded layout came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// Nothing stored under the key.
    Defaults,
    /// A stored record was read and overlaid on the defaults.
    Restored,
    /// The store failed or held an unreadable record; defaults were used.
    Fallback(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    /// Serialized record identical to the last write; the store was not touched.
    Unchanged,
}

/// Serializes the layout to a single named record and reads it back at startup.
pub struct LayoutPersistence {
    store: Box<dyn KeyValueStore>,
    key: String,
    last_digest: Option<blake3::Hash>,
    logger: Option<Logger>,
}

impl LayoutPersistence {
    pub fn new<S>(store: S, key: impl Into<String>) -> Self
    where
        S: KeyValueStore + 'static,
    {
        Self {
            store: Box::new(store),
            key: key.into(),
            last_digest: None,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Option<Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored layout. Never fails: any problem degrades to defaults.
    pub fn load(&mut self, config: &DeskConfig) -> (DeskLayout, LoadSource) {
        let raw = match self.store.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.log(LogLevel::Info, "layout_defaults", [json_kv("key", json!(self.key))]);
                return (DeskLayout::with_defaults(config), LoadSource::Defaults);
            }
            Err(err) => {
                let reason = err.to_string();
                self.log(
                    LogLevel::Warn,
                    "layout_load_failed",
                    [json_kv("key", json!(self.key)), json_kv("error", json!(reason))],
                );
                return (DeskLayout::with_defaults(config), LoadSource::Fallback(reason));
            }
        };

        match PersistedLayout::parse(&raw) {
            Some(record) => {
                let layout = record.into_layout(config);
                self.log(
                    LogLevel::Info,
                    "layout_restored",
                    [
                        json_kv("key", json!(self.key)),
                        json_kv("seats", json!(layout.seats().len())),
                    ],
                );
                (layout, LoadSource::Restored)
            }
            None => {
                let reason = "stored record is not a JSON object".to_string();
                self.log(
                    LogLevel::Warn,
                    "layout_record_corrupt",
                    [json_kv("key", json!(self.key)), json_kv("bytes", json!(raw.len()))],
                );
                (DeskLayout::with_defaults(config), LoadSource::Fallback(reason))
            }
        }
    }

    /// Write the layout unless it is identical to the last record written.
    pub fn save(&mut self, layout: &DeskLayout) -> Result<SaveOutcome> {
        let serialized = serde_json::to_string(&PersistedLayout::from_layout(layout))?;
        let digest = blake3::hash(serialized.as_bytes());
        if self.last_digest == Some(digest) {
            return Ok(SaveOutcome::Unchanged);
        }

        self.store.write(&self.key, &serialized)?;
        self.last_digest = Some(digest);
        self.log(
            LogLevel::Debug,
            "layout_saved",
            [
                json_kv("key", json!(self.key)),
                json_kv("bytes", json!(serialized.len())),
            ],
        );
        Ok(SaveOutcome::Written)
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        emit(self.logger.as_ref(), level, TARGET, message, fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeskError;
    use crate::geometry::Point;
    use crate::logging::MemorySink;
    use crate::persistence::MemoryStore;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            Err(DeskError::Storage("disk on fire".into()))
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(DeskError::Storage("disk on fire".into()))
        }
    }

    #[test]
    fn missing_record_uses_defaults() {
        let mut persistence = LayoutPersistence::new(MemoryStore::new(), "deskLayout");
        let (layout, source) = persistence.load(&DeskConfig::default());
        assert_eq!(source, LoadSource::Defaults);
        assert_eq!(layout, DeskLayout::with_defaults(&DeskConfig::default()));
    }

    #[test]
    fn save_then_load_restores_position_and_rotation() {
        let config = DeskConfig::default();
        let store = MemoryStore::new();
        let mut persistence = LayoutPersistence::new(store.clone(), "deskLayout");
        let (mut layout, _) = persistence.load(&config);
        layout.set_seat_position(1, Point::new(321, 123)).unwrap();
        layout.rotate_seat(1).unwrap();
        layout.rotate_seat(3).unwrap();
        layout.rotate_seat(3).unwrap();
        layout.toggle_seat(2, 7).unwrap();
        assert_eq!(persistence.save(&layout).unwrap(), SaveOutcome::Written);

        let mut reloaded = LayoutPersistence::new(store, "deskLayout");
        let (restored, source) = reloaded.load(&config);
        assert_eq!(source, LoadSource::Restored);
        for seat in layout.seats() {
            let other = restored.seat(seat.id).unwrap();
            assert_eq!(other.position, seat.position);
            assert_eq!(other.rotation, seat.rotation);
        }
        assert!(!restored.seat(2).unwrap().is_occupied);
    }

    #[test]
    fn identical_saves_are_skipped() {
        let store = MemoryStore::new();
        let mut persistence = LayoutPersistence::new(store, "deskLayout");
        let mut layout = DeskLayout::with_defaults(&DeskConfig::default());
        assert_eq!(persistence.save(&layout).unwrap(), SaveOutcome::Written);
        assert_eq!(persistence.save(&layout).unwrap(), SaveOutcome::Unchanged);
        layout.rotate_seat(1).unwrap();
        assert_eq!(persistence.save(&layout).unwrap(), SaveOutcome::Written);
    }

    #[test]
    fn corrupt_record_falls_back_and_logs() {
        let store = MemoryStore::new();
        store.insert("deskLayout", "{{{ definitely not json");
        let sink = MemorySink::new();
        let mut persistence = LayoutPersistence::new(store, "deskLayout")
            .with_logger(Some(Logger::new(sink.clone())));
        let (layout, source) = persistence.load(&DeskConfig::default());
        assert!(matches!(source, LoadSource::Fallback(_)));
        assert_eq!(layout.seats().len(), 4);
        assert!(sink.contains("layout_record_corrupt"));
    }

    #[test]
    fn store_failures_fall_back_on_load_and_error_on_save() {
        let mut persistence = LayoutPersistence::new(BrokenStore, "deskLayout");
        let (layout, source) = persistence.load(&DeskConfig::default());
        assert!(matches!(source, LoadSource::Fallback(reason) if reason.contains("disk on fire")));
        assert!(matches!(persistence.save(&layout), Err(DeskError::Storage(_))));
    }
}
