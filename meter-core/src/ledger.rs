//! In-memory heartbreak ledger
//!
//! The ledger is a plain value owned by its caller. It never touches the
//! filesystem; see [`crate::Meter`] for the persisted variant.
//!
//! # Example
//!
//! ```
//! use meter_core::{EventDraft, Ledger};
//!
//! let mut ledger = Ledger::new();
//! ledger.add(EventDraft::new("Alex", "ghosted", 40))?;
//! ledger.add(EventDraft::new("Sam", "faded", 50))?;
//!
//! // Would reach 110
//! assert!(ledger.add(EventDraft::new("Jo", "ignored", 20)).is_err());
//! assert_eq!(ledger.total(), 90);
//!
//! let top: Vec<&str> = ledger.leaderboard(5).into_iter().map(|e| e.person.as_str()).collect();
//! assert_eq!(top, ["Sam", "Alex"]);
//! # Ok::<(), meter_core::Error>(())
//! ```

use crate::{
    types::{EventDraft, EventId, HeartbreakEvent, Recorded, Severity, Standing},
    Config, Error, Result,
};
use chrono::Utc;
use std::collections::HashMap;

/// Fixed maximum for the running total
pub const CEILING: u32 = 100;

/// Ordered collection of heartbreak events
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Events in insertion order
    events: Vec<HeartbreakEvent>,

    /// Reject drafts with an empty reason
    require_reason: bool,

    /// Re-check the ceiling when an edit raises a severity
    enforce_ceiling_on_update: bool,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Empty ledger with default policy
    pub fn new() -> Self {
        Self::from_events(Vec::new())
    }

    /// Ledger over previously recorded events (as loaded from storage)
    pub fn from_events(events: Vec<HeartbreakEvent>) -> Self {
        let defaults = Config::default();
        Self {
            events,
            require_reason: defaults.require_reason,
            enforce_ceiling_on_update: defaults.enforce_ceiling_on_update,
        }
    }

    /// Take validation policy from configuration
    pub fn with_config(self, config: &Config) -> Self {
        self.require_reason(config.require_reason)
            .enforce_ceiling_on_update(config.enforce_ceiling_on_update)
    }

    /// Set whether an empty reason is rejected
    pub fn require_reason(mut self, required: bool) -> Self {
        self.require_reason = required;
        self
    }

    /// Set whether edits are checked against the ceiling
    pub fn enforce_ceiling_on_update(mut self, enforce: bool) -> Self {
        self.enforce_ceiling_on_update = enforce;
        self
    }

    /// Record a new event
    ///
    /// Rejected with [`Error::CapacityExceeded`] when the new total would pass
    /// [`CEILING`]; the ledger is left untouched in that case.
    pub fn add(&mut self, draft: EventDraft) -> Result<Recorded> {
        let (person, reason, severity) = self.validate(draft)?;

        let current = self.total();
        let requested = severity.value();
        if current + requested > CEILING {
            tracing::warn!(current, requested, "Rejected heartbreak over the ceiling");
            return Err(Error::CapacityExceeded {
                current,
                requested,
                ceiling: CEILING,
            });
        }

        let event = HeartbreakEvent {
            id: EventId::generate(),
            person,
            reason,
            severity,
            timestamp: Utc::now(),
        };
        let id = event.id;
        self.events.push(event);

        let total = current + requested;
        tracing::info!(%id, severity = requested, total, "Recorded heartbreak");

        Ok(Recorded { id, total })
    }

    /// Replace person, reason and severity of an event
    ///
    /// Id and timestamp are kept. The ceiling is only re-checked when
    /// `enforce_ceiling_on_update` is set, and then only for edits that raise
    /// the severity.
    pub fn update(&mut self, id: EventId, draft: EventDraft) -> Result<&HeartbreakEvent> {
        let (person, reason, severity) = self.validate(draft)?;
        let index = self.position(id)?;

        let old = self.events[index].severity.value();
        let new = severity.value();
        if self.enforce_ceiling_on_update && new > old {
            let others = self.total() - old;
            if others + new > CEILING {
                tracing::warn!(%id, others, requested = new, "Rejected edit over the ceiling");
                return Err(Error::CapacityExceeded {
                    current: others,
                    requested: new,
                    ceiling: CEILING,
                });
            }
        }

        let event = &mut self.events[index];
        event.person = person;
        event.reason = reason;
        event.severity = severity;
        tracing::info!(%id, severity = new, "Updated heartbreak");

        Ok(&self.events[index])
    }

    /// Remove an event and return it
    pub fn delete(&mut self, id: EventId) -> Result<HeartbreakEvent> {
        let index = self.position(id)?;
        let event = self.events.remove(index);
        tracing::info!(%id, "Deleted heartbreak");
        Ok(event)
    }

    /// Sum of all severities
    pub fn total(&self) -> u32 {
        self.events.iter().map(|e| e.severity.value()).sum()
    }

    /// Headroom left under the ceiling
    pub fn remaining(&self) -> u32 {
        CEILING.saturating_sub(self.total())
    }

    /// True once the total has reached the ceiling
    pub fn is_maxed_out(&self) -> bool {
        self.total() >= CEILING
    }

    /// Individual events by severity, highest first
    ///
    /// Ties keep insertion order.
    pub fn leaderboard(&self, limit: usize) -> Vec<&HeartbreakEvent> {
        let mut ranked: Vec<&HeartbreakEvent> = self.events.iter().collect();
        ranked.sort_by(|a, b| b.severity.cmp(&a.severity));
        ranked.truncate(limit);
        ranked
    }

    /// Severity summed per person, highest first
    ///
    /// Ties keep the order in which each person first appears.
    pub fn standings(&self) -> Vec<Standing> {
        let mut standings: Vec<Standing> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();

        for event in &self.events {
            let slot = *slots.entry(event.person.as_str()).or_insert_with(|| {
                standings.push(Standing {
                    person: event.person.clone(),
                    total: 0,
                    events: 0,
                });
                standings.len() - 1
            });
            standings[slot].total += event.severity.value();
            standings[slot].events += 1;
        }

        standings.sort_by(|a, b| b.total.cmp(&a.total));
        standings
    }

    /// Look up one event
    pub fn get(&self, id: EventId) -> Option<&HeartbreakEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// All events in insertion order
    pub fn list(&self) -> &[HeartbreakEvent] {
        &self.events
    }

    /// Iterate events in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &HeartbreakEvent> {
        self.events.iter()
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn position(&self, id: EventId) -> Result<usize> {
        self.events
            .iter()
            .position(|e| e.id == id)
            .ok_or(Error::NotFound(id))
    }

    fn validate(&self, draft: EventDraft) -> Result<(String, String, Severity)> {
        let person = draft.person.trim();
        if person.is_empty() {
            return Err(Error::InvalidInput("person must not be empty".to_string()));
        }

        let reason = draft.reason.trim();
        if self.require_reason && reason.is_empty() {
            return Err(Error::InvalidInput("reason must not be empty".to_string()));
        }

        let severity = Severity::new(draft.severity)?;

        Ok((person.to_string(), reason.to_string(), severity))
    }
}
