//! Core types for the meter
//!
//! All persisted types serialize to plain JSON so the backing file stays
//! readable and hand-editable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable event identifier (UUIDv7 for time-ordering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Generate a fresh id
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| crate::Error::InvalidInput(format!("bad event id {:?}: {}", s, e)))
    }
}

/// Severity score in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Severity(u8);

impl Severity {
    /// Highest accepted score
    pub const MAX: u8 = 100;

    /// Create from a raw score, rejecting anything outside `[0, 100]`
    pub fn new(value: i64) -> crate::Result<Self> {
        if (0..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(crate::Error::InvalidInput(format!(
                "severity must be between 0 and {}, got {}",
                Self::MAX,
                value
            )))
        }
    }

    /// Score as a number
    pub fn value(&self) -> u32 {
        self.0 as u32
    }
}

impl TryFrom<i64> for Severity {
    type Error = crate::Error;

    fn try_from(value: i64) -> crate::Result<Self> {
        Self::new(value)
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> u8 {
        severity.0
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One recorded heartbreak
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbreakEvent {
    /// Stable id (files from older front-ends carry none; one is assigned on load)
    #[serde(default = "EventId::generate")]
    pub id: EventId,

    /// Who is responsible
    pub person: String,

    /// Why (may be empty when reasons are optional)
    #[serde(default)]
    pub reason: String,

    /// Cost added to the running total
    pub severity: Severity,

    /// Creation instant, kept across edits
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// User-supplied fields for add and update, validated by the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    /// Responsible party
    pub person: String,
    /// Free-text reason
    pub reason: String,
    /// Raw score; range-checked on submission
    pub severity: i64,
}

impl EventDraft {
    /// Create a draft
    pub fn new(person: impl Into<String>, reason: impl Into<String>, severity: i64) -> Self {
        Self {
            person: person.into(),
            reason: reason.into(),
            severity,
        }
    }
}

/// Outcome of a successful add
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recorded {
    /// Id of the new event
    pub id: EventId,
    /// Running total after the add
    pub total: u32,
}

/// Severity aggregated for one person
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// Responsible party
    pub person: String,
    /// Sum of their severities
    pub total: u32,
    /// Number of events recorded against them
    pub events: usize,
}

/// RFC 3339 on write; also accepts zone-less ISO-8601 (read as UTC) on load.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| D::Error::custom(format!("invalid timestamp {:?}: {}", raw, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_bounds() {
        assert_eq!(Severity::new(0).unwrap().value(), 0);
        assert_eq!(Severity::new(100).unwrap().value(), 100);
        assert!(Severity::new(101).is_err());
        assert!(Severity::new(-1).is_err());
    }

    #[test]
    fn test_event_id_parse() {
        let id = EventId::generate();
        let parsed: EventId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<EventId>().is_err());
    }

    #[test]
    fn test_event_json_shape() {
        let event = HeartbreakEvent {
            id: EventId::generate(),
            person: "Alex".into(),
            reason: "ghosted".into(),
            severity: Severity::new(40).unwrap(),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["person"], "Alex");
        assert_eq!(value["severity"], 40);
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(value["id"], event.id.to_string());
    }

    #[test]
    fn test_legacy_record_without_id() {
        let raw = r#"{"person":"Sam","reason":"faded","severity":50,"timestamp":"2024-05-01T12:34:56.789012"}"#;
        let event: HeartbreakEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.person, "Sam");
        assert_eq!(event.severity.value(), 50);
        assert_eq!(event.timestamp.to_rfc3339(), "2024-05-01T12:34:56.789012+00:00");
    }

    #[test]
    fn test_out_of_range_severity_rejected_on_load() {
        let raw = r#"{"person":"Sam","reason":"","severity":150,"timestamp":"2024-05-01T12:00:00Z"}"#;
        assert!(serde_json::from_str::<HeartbreakEvent>(raw).is_err());
    }
}
