//! Process-safe event counter shared by all workers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

struct CounterState {
    count: u64,
    period: Option<Duration>,
    last_report: Instant,
}

/// Monotonic counter shared by every worker pipeline.
///
/// Every mutation happens under the internal mutex, so increments are
/// linearizable across workers and no update is lost. When a reporting period
/// is configured, the incrementing worker emits a status line once the period
/// has elapsed and the in-period count restarts.
#[derive(Clone)]
pub struct SharedCounter {
    state: Arc<Mutex<CounterState>>,
}

impl SharedCounter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CounterState {
                count: 0,
                period: None,
                last_report: Instant::now(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, CounterState> {
        // A worker that panicked while holding the lock must not take the
        // rest of the fleet down with it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configure the status reporting period. Idempotent: later workers
    /// re-applying the same period do not disturb the running window.
    pub fn setup(&self, period: Duration) {
        let mut state = self.state();
        if state.period != Some(period) {
            state.period = Some(period);
            state.last_report = Instant::now();
        }
    }

    /// Count one processed event; reports and restarts the in-period count
    /// when the reporting period has elapsed.
    pub fn increment(&self) {
        let mut state = self.state();
        state.count += 1;
        if let Some(period) = state.period {
            if !period.is_zero() && state.last_report.elapsed() >= period {
                tracing::info!(
                    events = state.count,
                    period_secs = period.as_secs_f64(),
                    "processed events across all workers"
                );
                state.count = 0;
                state.last_report = Instant::now();
            }
        }
    }

    /// Events counted since the last report.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.state().count
    }
}

impl Default for SharedCounter {
    fn default() -> Self {
        Self::new()
    }
}
