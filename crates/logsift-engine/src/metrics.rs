//! Periodic export of aggregated pipeline metrics.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::json;

use logsift_types::MetricsSnapshot;

use crate::config::types::MetricsConfig;
use crate::shared::SharedMap;

/// Emits the pipeline-wide metrics aggregate on a fixed period.
///
/// The aggregate itself is computed by the caller on every report (never
/// cached here), so it always reflects the processor chain of the moment,
/// including a fresh chain after a fatal-error rebuild.
pub struct MetricsReporter {
    enabled: bool,
    period: Duration,
    last_report: Instant,
}

impl MetricsReporter {
    #[must_use]
    pub fn new(config: &MetricsConfig) -> Self {
        Self {
            enabled: config.enabled,
            period: Duration::from_secs(config.period),
            last_report: Instant::now(),
        }
    }

    /// Returns `true` if a report is due now.
    #[must_use]
    pub fn is_due(&self) -> bool {
        self.enabled && self.last_report.elapsed() >= self.period
    }

    /// Log the snapshot and publish it into the shared map under the worker
    /// key, holding the worker lock for the compound update.
    pub fn report(
        &mut self,
        worker: usize,
        snapshot: MetricsSnapshot,
        lock: &Arc<Mutex<()>>,
        shared: &SharedMap,
    ) {
        tracing::info!(
            worker,
            processed_events = snapshot.number_of_processed_events,
            warnings = snapshot.number_of_warnings,
            errors = snapshot.number_of_errors,
            "pipeline metrics"
        );
        let _guard = lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        shared.insert(
            format!("pipeline-{worker}.metrics"),
            json!({
                "number_of_processed_events": snapshot.number_of_processed_events,
                "number_of_warnings": snapshot.number_of_warnings,
                "number_of_errors": snapshot.number_of_errors,
            }),
        );
        self.last_report = Instant::now();
    }
}
