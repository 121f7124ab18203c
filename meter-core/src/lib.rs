//! Heartbreak Meter Core
//!
//! A capped ledger of heartbreak events with a ranked leaderboard.
//!
//! # Architecture
//!
//! - **Ledger**: Pure in-memory list of events; the running total is always
//!   recomputed from it
//! - **Storage**: JSON array on disk, read and overwritten as a whole file
//! - **Meter**: A ledger bound to its storage, persisted after every mutation
//!
//! # Invariants
//!
//! - Capped total: an add never pushes Σ(severity) above [`CEILING`]
//! - Rejected adds never mutate state
//! - Event ids are stable across edits, deletes and reloads

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod error;
pub mod config;
pub mod ledger;
pub mod storage;
pub mod meter;

// Re-exports
pub use error::{Error, Result};
pub use types::{EventDraft, EventId, HeartbreakEvent, Recorded, Severity, Standing};
pub use ledger::{Ledger, CEILING};
pub use storage::Storage;
pub use meter::Meter;
pub use config::Config;

/// Message shown instead of an error once the meter is full.
pub const SUPPORTIVE_MESSAGE: &str = "I'm so sorry. You deserve to be loved. \
But I'm telling you, you are loved. Even if you feel you're alone, \
don't let your light go out. You're still here, and you're brave for doing that.";
