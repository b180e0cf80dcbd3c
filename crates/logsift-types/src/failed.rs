//! Failed-event record and timestamp types.
//!
//! [`FailedEvent`] captures events the pipeline could not process so they can
//! be inspected or replayed later.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::event::Event;

/// ISO-8601 formatted timestamp string.
///
/// Thin wrapper providing type clarity without requiring a datetime library
/// dependency in this crate. No format validation; callers are trusted to
/// provide valid ISO-8601 strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Create a new timestamp from an ISO-8601 string.
    #[must_use]
    pub fn new(iso8601: impl Into<String>) -> Self {
        Self(iso8601.into())
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Record of one event the pipeline could not process.
///
/// `original` is the raw payload as retrieved (it may not be a JSON object if
/// the input already rejected it); `processed` is the partially processed
/// state at the point of failure, empty when the failure happened before any
/// processor ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedEvent {
    /// Human-readable error description.
    pub error_message: String,
    /// Raw payload as retrieved from the input.
    pub original: Value,
    /// Partially processed event state at the point of failure.
    pub processed: Event,
    /// When the failure occurred.
    pub failed_at: Timestamp,
}
