//! Shared key→value back-channel between workers and the supervisor.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

/// Mapping shared by all workers.
///
/// Workers publish worker-keyed auxiliary state (last stored counts, metrics
/// snapshots) for the supervisor to observe. It is a back-channel, not a
/// primary store, and there is no ownership transfer. Compound
/// read-modify-write sequences spanning this map and other shared state must
/// hold the worker lock injected through
/// [`WorkerContext`](crate::supervisor::WorkerContext).
#[derive(Clone, Default)]
pub struct SharedMap {
    inner: Arc<Mutex<HashMap<String, Value>>>,
}

impl SharedMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish a value under `key`, replacing any previous value.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.entries().insert(key.into(), value);
    }

    /// Read the value published under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries().get(key).cloned()
    }

    /// Copy of the full mapping.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.entries().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
