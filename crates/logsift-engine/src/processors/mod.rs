//! Processor contract: one stage of the per-event transformation chain.

use logsift_types::{Event, ExtraOutputs, ProcessorError, ProcessorMetrics};

pub mod deleter;

/// A pipeline stage that inspects or mutates one event at a time and may emit
/// side-output documents for alternate targets.
///
/// Processors are owned exclusively by one pipeline; the chain order is fixed
/// at setup time and significant. A processor signals a recoverable per-event
/// condition with [`ProcessorError::Warning`] (the chain continues) and an
/// unrecoverable one with [`ProcessorError::Critical`] (the chain aborts and
/// the event is diverted to the failed-event sink).
pub trait Processor: Send {
    /// Instance name from the configuration, used in log lines.
    fn name(&self) -> &str;

    /// Idempotent resource acquisition (e.g. compile rules).
    fn setup(&mut self) -> Result<(), ProcessorError> {
        Ok(())
    }

    /// Handle one event, mutating it in place and/or returning side outputs.
    fn process(&mut self, event: &mut Event) -> Result<ExtraOutputs, ProcessorError>;

    /// Counters owned by this processor; read by the pipeline's aggregator.
    fn metrics(&self) -> &ProcessorMetrics;

    /// Idempotent resource release.
    fn shut_down(&mut self) {}
}
