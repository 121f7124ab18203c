//! Ledger bound to its backing file
//!
//! Every successful mutation rewrites the file before returning. Rejected
//! operations never touch it.

use crate::{
    types::{EventDraft, EventId, HeartbreakEvent, Recorded},
    Config, Ledger, Result, Storage,
};

/// Persisted heartbreak ledger
#[derive(Debug)]
pub struct Meter {
    ledger: Ledger,
    storage: Storage,
}

impl Meter {
    /// Open the configured store and load its events
    ///
    /// Records that were stored without an id get one here, and the file is
    /// rewritten at once so those ids survive the next open.
    pub fn open(config: &Config) -> Result<Self> {
        let storage = Storage::open(config)?;
        let loaded = storage.load();
        let ledger = Ledger::from_events(loaded.events).with_config(config);

        if loaded.assigned_ids > 0 {
            match storage.save(ledger.list()) {
                Ok(()) => tracing::info!(
                    assigned = loaded.assigned_ids,
                    "Stored ids for legacy records"
                ),
                Err(e) => tracing::warn!("Cannot store ids for legacy records: {}", e),
            }
        }

        tracing::info!(
            events = ledger.len(),
            total = ledger.total(),
            "Heartbreak meter opened"
        );

        Ok(Self { ledger, storage })
    }

    /// Read access to the in-memory ledger
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Backing store
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Record a new event and persist
    pub fn add(&mut self, draft: EventDraft) -> Result<Recorded> {
        let recorded = self.ledger.add(draft)?;
        self.persist()?;
        Ok(recorded)
    }

    /// Edit an event and persist
    pub fn update(&mut self, id: EventId, draft: EventDraft) -> Result<HeartbreakEvent> {
        let updated = self.ledger.update(id, draft)?.clone();
        self.persist()?;
        Ok(updated)
    }

    /// Remove an event and persist
    pub fn delete(&mut self, id: EventId) -> Result<HeartbreakEvent> {
        let removed = self.ledger.delete(id)?;
        self.persist()?;
        Ok(removed)
    }

    fn persist(&self) -> Result<()> {
        self.storage.save(self.ledger.list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn test_config(dir: &tempfile::TempDir) -> Config {
        Config {
            data_file: dir.path().join("heartbreak_data.json"),
            ..Config::default()
        }
    }

    #[test]
    fn test_mutations_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);

        let mut meter = Meter::open(&config).unwrap();
        let alex = meter.add(EventDraft::new("Alex", "ghosted", 40)).unwrap();
        let sam = meter.add(EventDraft::new("Sam", "faded", 50)).unwrap();
        meter
            .update(alex.id, EventDraft::new("Alex", "ghosted on a birthday", 45))
            .unwrap();
        meter.delete(sam.id).unwrap();

        let reopened = Meter::open(&config).unwrap();
        assert_eq!(reopened.ledger().list(), meter.ledger().list());
        assert_eq!(reopened.ledger().total(), 45);
        assert_eq!(
            reopened.ledger().get(alex.id).unwrap().reason,
            "ghosted on a birthday"
        );
    }

    #[test]
    fn test_rejected_add_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);

        let mut meter = Meter::open(&config).unwrap();
        let err = meter.add(EventDraft::new("Alex", "everything", 101)).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        meter.add(EventDraft::new("Alex", "everything", 100)).unwrap();
        let before = std::fs::read(&config.data_file).unwrap();

        let err = meter.add(EventDraft::new("Sam", "faded", 1)).unwrap_err();
        assert!(err.is_capacity_exceeded());
        assert_eq!(std::fs::read(&config.data_file).unwrap(), before);
        assert!(meter.ledger().is_maxed_out());
    }

    #[test]
    fn test_missing_ids_do_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);

        let mut meter = Meter::open(&config).unwrap();
        let missing = EventId::generate();
        assert!(matches!(meter.delete(missing), Err(Error::NotFound(_))));
        assert!(matches!(
            meter.update(missing, EventDraft::new("Alex", "ghosted", 1)),
            Err(Error::NotFound(_))
        ));
        assert!(!config.data_file.exists());
    }

    #[test]
    fn test_legacy_ids_are_stable_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        std::fs::write(
            &config.data_file,
            r#"[{"person": "Alex", "reason": "ghosted", "severity": 40, "timestamp": "2024-02-14T20:15:00.123456"}]"#,
        )
        .unwrap();

        let first = Meter::open(&config).unwrap();
        let id = first.ledger().list()[0].id;

        let mut second = Meter::open(&config).unwrap();
        assert_eq!(second.ledger().list()[0].id, id);

        let removed = second.delete(id).unwrap();
        assert_eq!(removed.person, "Alex");
        assert!(Meter::open(&config).unwrap().ledger().is_empty());
    }

    #[test]
    fn test_policy_comes_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            require_reason: false,
            ..test_config(&dir)
        };

        let mut meter = Meter::open(&config).unwrap();
        meter.add(EventDraft::new("Alex", "", 10)).unwrap();
        assert_eq!(meter.ledger().len(), 1);
    }
}
