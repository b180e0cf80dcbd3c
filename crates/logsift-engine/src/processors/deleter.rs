//! Deleter processor: drops events matching a filter field.
//!
//! An event carrying the configured filter field is cleared in place; the
//! engine treats the now-empty event as deleted and neither the remaining
//! chain nor the output ever sees it.

use serde::Deserialize;

use logsift_types::{Event, ExtraOutputs, ProcessorError, ProcessorMetrics};

use super::Processor;

/// Configuration for [`Deleter`].
#[derive(Debug, Clone, Deserialize)]
pub struct DeleterConfig {
    /// Events carrying this top-level field are deleted.
    pub filter: String,
}

/// Processor that deletes matching events.
pub struct Deleter {
    name: String,
    filter: String,
    metrics: ProcessorMetrics,
}

impl Deleter {
    #[must_use]
    pub fn new(name: impl Into<String>, config: DeleterConfig) -> Self {
        Self {
            name: name.into(),
            filter: config.filter,
            metrics: ProcessorMetrics::new(),
        }
    }
}

impl Processor for Deleter {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&mut self, event: &mut Event) -> Result<ExtraOutputs, ProcessorError> {
        self.metrics.event_processed();
        if event.contains_field(&self.filter) {
            event.clear();
        }
        Ok(ExtraOutputs::None)
    }

    fn metrics(&self) -> &ProcessorMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn deleter(filter: &str) -> Deleter {
        Deleter::new(
            "test deleter",
            DeleterConfig {
                filter: filter.into(),
            },
        )
    }

    #[test]
    fn matching_event_is_cleared() {
        let mut processor = deleter("delete_me");
        let mut event = Event::from_value(json!({"delete_me": "2"})).unwrap();
        processor.process(&mut event).unwrap();
        assert!(event.is_empty());
    }

    #[test]
    fn non_matching_event_is_untouched() {
        let mut processor = deleter("delete_me");
        let mut event = Event::from_value(json!({"do_not_delete": "1"})).unwrap();
        processor.process(&mut event).unwrap();
        assert_eq!(event.get("do_not_delete"), Some(&json!("1")));
    }

    #[test]
    fn every_event_counts_as_processed() {
        let mut processor = deleter("delete_me");
        let mut keep = Event::from_value(json!({"do_not_delete": "1"})).unwrap();
        let mut drop = Event::from_value(json!({"delete_me": "2"})).unwrap();
        processor.process(&mut keep).unwrap();
        processor.process(&mut drop).unwrap();
        assert_eq!(processor.metrics().number_of_processed_events, 2);
    }
}
