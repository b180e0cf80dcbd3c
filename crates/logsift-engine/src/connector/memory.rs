//! In-memory connector pair for tests and demos.
//!
//! The input yields a configured list of JSON documents and reports
//! `SourceDisconnected` once drained; non-object documents raise a critical
//! error with the payload attached, so malformed-unit handling can be
//! exercised without a broker. The output collects everything it is given
//! behind a cloneable handle.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;

use logsift_types::{Event, FailedEvent, InputError, OutputError, Timestamp};

use super::{Input, Output};

/// Input connector that replays a fixed list of documents.
pub struct MemoryInput {
    documents: VecDeque<Value>,
    last_timeout: Option<Duration>,
    setup_calls: usize,
    shut_down_calls: usize,
}

impl MemoryInput {
    #[must_use]
    pub fn new(documents: Vec<Value>) -> Self {
        Self {
            documents: documents.into(),
            last_timeout: None,
            setup_calls: 0,
            shut_down_calls: 0,
        }
    }

    /// Timeout passed to the most recent `get_next` call.
    #[must_use]
    pub fn last_timeout(&self) -> Option<Duration> {
        self.last_timeout
    }

    /// Remaining documents not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn setup_calls(&self) -> usize {
        self.setup_calls
    }

    #[must_use]
    pub fn shut_down_calls(&self) -> usize {
        self.shut_down_calls
    }
}

impl Input for MemoryInput {
    fn describe_endpoint(&self) -> String {
        "memory".into()
    }

    fn setup(&mut self) -> Result<(), InputError> {
        self.setup_calls += 1;
        Ok(())
    }

    fn get_next(&mut self, timeout: Duration) -> Result<Event, InputError> {
        self.last_timeout = Some(timeout);
        let Some(document) = self.documents.pop_front() else {
            // Block for the poll timeout, as a broker client would, so a
            // drained source does not busy-spin the worker loop.
            std::thread::sleep(timeout);
            return Err(InputError::SourceDisconnected);
        };
        Event::from_value(document)
            .map_err(|raw| InputError::critical("event is not a JSON object", raw))
    }

    fn shut_down(&mut self) {
        self.shut_down_calls += 1;
    }
}

#[derive(Default)]
struct MemoryOutputState {
    events: Vec<Event>,
    custom: Vec<(String, Event)>,
    failed: Vec<FailedEvent>,
}

/// Cloneable view on everything a [`MemoryOutput`] has collected.
#[derive(Clone, Default)]
pub struct MemoryOutputHandle {
    state: Arc<Mutex<MemoryOutputState>>,
}

impl MemoryOutputHandle {
    fn state(&self) -> MutexGuard<'_, MemoryOutputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Events stored through `store`, in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    /// `(target, document)` pairs stored through `store_custom`.
    #[must_use]
    pub fn custom_events(&self) -> Vec<(String, Event)> {
        self.state().custom.clone()
    }

    /// Records stored through `store_failed`.
    #[must_use]
    pub fn failed_events(&self) -> Vec<FailedEvent> {
        self.state().failed.clone()
    }
}

/// Output connector that collects events in memory.
pub struct MemoryOutput {
    handle: MemoryOutputHandle,
    setup_calls: usize,
    shut_down_calls: usize,
}

impl MemoryOutput {
    /// Create the output together with the handle exposing its collections.
    #[must_use]
    pub fn new() -> (Self, MemoryOutputHandle) {
        let handle = MemoryOutputHandle::default();
        (
            Self {
                handle: handle.clone(),
                setup_calls: 0,
                shut_down_calls: 0,
            },
            handle,
        )
    }

    #[must_use]
    pub fn setup_calls(&self) -> usize {
        self.setup_calls
    }

    #[must_use]
    pub fn shut_down_calls(&self) -> usize {
        self.shut_down_calls
    }
}

impl Output for MemoryOutput {
    fn describe_endpoint(&self) -> String {
        "memory".into()
    }

    fn setup(&mut self) -> Result<(), OutputError> {
        self.setup_calls += 1;
        Ok(())
    }

    fn store(&mut self, event: Event) -> Result<(), OutputError> {
        self.handle.state().events.push(event);
        Ok(())
    }

    fn store_custom(&mut self, event: Event, target: &str) -> Result<(), OutputError> {
        self.handle.state().custom.push((target.to_string(), event));
        Ok(())
    }

    fn store_failed(
        &mut self,
        error_message: &str,
        original: Value,
        processed: Event,
    ) -> Result<(), OutputError> {
        let record = FailedEvent {
            error_message: error_message.to_string(),
            original,
            processed,
            failed_at: Timestamp::new(chrono::Utc::now().to_rfc3339()),
        };
        self.handle.state().failed.push(record);
        Ok(())
    }

    fn shut_down(&mut self) {
        self.shut_down_calls += 1;
    }
}
