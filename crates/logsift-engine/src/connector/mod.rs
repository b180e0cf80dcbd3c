//! Connector contracts: the boundary components that move events into and
//! out of a pipeline.
//!
//! A connector instance is owned exclusively by one pipeline and never shared
//! across workers. `setup` and `shut_down` must be idempotent because the engine
//! calls them again when it rebuilds a pipeline after a fatal error.

use std::time::Duration;

use serde_json::Value;

use logsift_types::{Event, InputError, OutputError};

pub mod jsonl;
pub mod memory;

/// Source side of a pipeline.
pub trait Input: Send {
    /// Diagnostic name used in log lines (e.g. `"jsonl"`).
    fn describe_endpoint(&self) -> String;

    /// Idempotent resource acquisition (open files, connections).
    fn setup(&mut self) -> Result<(), InputError> {
        Ok(())
    }

    /// Return exactly one event within `timeout`.
    ///
    /// Fails with [`InputError::SourceDisconnected`] when no event is
    /// currently available and the source is not considered broken, with
    /// [`InputError::Warning`] for a recoverable per-call problem, with
    /// [`InputError::Critical`] when a specific malformed unit was read (the
    /// payload is attached so the engine can persist it as a failed event),
    /// or with [`InputError::Fatal`] when the connector itself is unusable
    /// and must be rebuilt.
    fn get_next(&mut self, timeout: Duration) -> Result<Event, InputError>;

    /// Commit progress for everything handed out so far (e.g. persist an
    /// offset). The engine invokes this once per cycle, after the store
    /// phase; a failure here is logged as a warning and never rebuilds the
    /// pipeline. No-op by default for inputs without batching.
    fn batch_finished_callback(&mut self) -> Result<(), InputError> {
        Ok(())
    }

    /// Idempotent resource release.
    fn shut_down(&mut self) {}
}

/// Sink side of a pipeline.
pub trait Output: Send {
    /// Diagnostic name used in log lines.
    fn describe_endpoint(&self) -> String;

    /// Idempotent resource acquisition.
    fn setup(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    /// Store one fully processed event.
    ///
    /// [`OutputError::Critical`] must carry the offending event back so the
    /// engine can divert it to [`Output::store_failed`].
    fn store(&mut self, event: Event) -> Result<(), OutputError>;

    /// Store one document in a secondary/alternate destination.
    fn store_custom(&mut self, event: Event, target: &str) -> Result<(), OutputError>;

    /// Persist an event the pipeline could not process. `original` is the raw
    /// payload as retrieved (not necessarily a JSON object), `processed` the
    /// partially processed state at the point of failure.
    fn store_failed(
        &mut self,
        error_message: &str,
        original: Value,
        processed: Event,
    ) -> Result<(), OutputError>;

    /// Idempotent resource release.
    fn shut_down(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NopInput;

    impl Input for NopInput {
        fn describe_endpoint(&self) -> String {
            "nop".into()
        }

        fn get_next(&mut self, _timeout: Duration) -> Result<Event, InputError> {
            Err(InputError::SourceDisconnected)
        }
    }

    #[test]
    fn default_lifecycle_methods_are_noops() {
        let mut input = NopInput;
        assert!(input.setup().is_ok());
        assert!(input.batch_finished_callback().is_ok());
        input.shut_down();
        assert!(matches!(
            input.get_next(Duration::from_millis(1)),
            Err(InputError::SourceDisconnected)
        ));
    }
}
