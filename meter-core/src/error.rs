//! Error types for the meter

use crate::types::EventId;
use thiserror::Error;

/// Result type for meter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Meter errors
#[derive(Error, Debug)]
pub enum Error {
    /// Empty person, empty required reason, or severity out of range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Adding the severity would push the total past the ceiling
    #[error("Capacity exceeded: {current} + {requested} would pass {ceiling}")]
    CapacityExceeded {
        /// Total before the rejected operation
        current: u32,
        /// Severity that was requested
        requested: u32,
        /// Fixed ceiling
        ceiling: u32,
    },

    /// No event with this id
    #[error("Event not found: {0}")]
    NotFound(EventId),

    /// Backing file could not be written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the error is the "meter is full" outcome rather than a fault.
    ///
    /// Front-ends show [`crate::SUPPORTIVE_MESSAGE`] for this case.
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, Error::CapacityExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_exceeded_display() {
        let err = Error::CapacityExceeded {
            current: 90,
            requested: 20,
            ceiling: 100,
        };
        assert!(err.is_capacity_exceeded());
        assert_eq!(err.to_string(), "Capacity exceeded: 90 + 20 would pass 100");
    }

    #[test]
    fn test_other_errors_are_not_capacity() {
        assert!(!Error::InvalidInput("empty person".into()).is_capacity_exceeded());
        assert!(!Error::StorageUnavailable("disk full".into()).is_capacity_exceeded());
    }
}
