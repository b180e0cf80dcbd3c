//! Closed error taxonomy for connectors and processors.
//!
//! The engine classifies every failure crossing its boundary by severity:
//! warnings never escape a cycle, critical errors divert one event to the
//! failed-event sink, fatal errors force a connector rebuild. The taxonomy is
//! a set of tagged enums rather than a trait hierarchy so the recovery state
//! machine can match exhaustively.

use serde_json::Value;

use crate::event::Event;

/// Failure raised by an input connector.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// Nothing to read right now; the source is not considered broken.
    #[error("no event available from source")]
    SourceDisconnected,

    /// Recoverable per-call problem; the cycle is skipped.
    #[error("{0}")]
    Warning(String),

    /// One identifiable unit was unreadable. The offending payload is
    /// attached so it can be persisted as a failed event.
    #[error("{message}")]
    Critical { message: String, payload: Value },

    /// The connector itself is unusable and must be rebuilt.
    #[error("{0}")]
    Fatal(String),
}

impl InputError {
    /// Critical input failure with the offending payload attached.
    #[must_use]
    pub fn critical(message: impl Into<String>, payload: Value) -> Self {
        Self::Critical {
            message: message.into(),
            payload,
        }
    }
}

/// Failure raised by an output connector.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Recoverable per-call problem; the event is lost for this cycle only.
    #[error("{0}")]
    Warning(String),

    /// One identifiable event is unstorable. The event is attached so it can
    /// be persisted as a failed event.
    #[error("{message}")]
    Critical { message: String, event: Event },

    /// The connector itself is unusable and must be rebuilt.
    #[error("{0}")]
    Fatal(String),
}

impl OutputError {
    /// Critical output failure with the offending event attached.
    #[must_use]
    pub fn critical(message: impl Into<String>, event: Event) -> Self {
        Self::Critical {
            message: message.into(),
            event,
        }
    }
}

/// Failure raised by a processor while handling one event.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    /// Recoverable condition on one event; the chain continues.
    #[error("{0}")]
    Warning(String),

    /// Unrecoverable per-event failure; the chain is aborted and the event is
    /// routed to the failed-event sink.
    #[error(transparent)]
    Critical(#[from] anyhow::Error),
}
