//! Storage layer using a single JSON file
//!
//! # Layout
//!
//! The file holds one JSON array; each element is a [`HeartbreakEvent`] with
//! `id`, `person`, `reason`, `severity` and `timestamp`. Every save rewrites
//! the whole file.
//!
//! Reads never fail: a missing, unreadable or corrupted file loads as an empty
//! list. Writes do fail, with [`Error::StorageUnavailable`].

use crate::{
    error::{Error, Result},
    types::{EventId, HeartbreakEvent},
    Config,
};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Events read back from storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loaded {
    /// Events in stored order
    pub events: Vec<HeartbreakEvent>,

    /// Records that carried no `id` and were given a fresh one
    pub assigned_ids: usize,
}

/// Only the `id` of a stored record, to tell stored ids from assigned ones
#[derive(Deserialize)]
struct StoredId {
    #[serde(default)]
    id: Option<EventId>,
}

/// Decode a stored event list
///
/// Empty or malformed input yields an empty list.
pub fn decode(bytes: &[u8]) -> Loaded {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Loaded::default();
    }

    let events: Vec<HeartbreakEvent> = match serde_json::from_slice(bytes) {
        Ok(events) => events,
        Err(e) => {
            tracing::warn!("Discarding unparseable event list: {}", e);
            return Loaded::default();
        }
    };

    let assigned_ids = serde_json::from_slice::<Vec<StoredId>>(bytes)
        .map(|ids| ids.iter().filter(|r| r.id.is_none()).count())
        .unwrap_or(0);

    Loaded {
        events,
        assigned_ids,
    }
}

/// Encode an event list
pub fn encode(events: &[HeartbreakEvent], pretty: bool) -> Result<Vec<u8>> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(events)?
    } else {
        serde_json::to_vec(events)?
    };
    Ok(bytes)
}

/// JSON file backing a ledger
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
    pretty: bool,
}

impl Storage {
    /// Bind to the configured data file
    ///
    /// The parent directory is created if it does not exist yet; the file
    /// itself is only created on the first save.
    pub fn open(config: &Config) -> Result<Self> {
        let path = config.data_file.clone();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::StorageUnavailable(format!("create {}: {}", parent.display(), e))
            })?;
        }

        tracing::info!("Opened heartbreak store at {:?}", path);

        Ok(Self {
            path,
            pretty: config.pretty_json,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all events
    pub fn load(&self) -> Loaded {
        match std::fs::read(&self.path) {
            Ok(bytes) => {
                let loaded = decode(&bytes);
                tracing::debug!(
                    bytes = bytes.len(),
                    events = loaded.events.len(),
                    assigned_ids = loaded.assigned_ids,
                    "Loaded event list"
                );
                loaded
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No event list at {:?}, starting empty", self.path);
                Loaded::default()
            }
            Err(e) => {
                tracing::warn!("Cannot read {:?}, starting empty: {}", self.path, e);
                Loaded::default()
            }
        }
    }

    /// Overwrite the file with `events`
    pub fn save(&self, events: &[HeartbreakEvent]) -> Result<()> {
        let bytes = encode(events, self.pretty)?;

        std::fs::write(&self.path, &bytes).map_err(|e| {
            Error::StorageUnavailable(format!("write {}: {}", self.path.display(), e))
        })?;

        tracing::debug!(bytes = bytes.len(), events = events.len(), "Saved event list");
        Ok(())
    }
}
