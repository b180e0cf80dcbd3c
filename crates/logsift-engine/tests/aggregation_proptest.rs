use proptest::prelude::*;

use logsift_engine::counter::SharedCounter;
use logsift_types::{MetricsSnapshot, ProcessorMetrics};

proptest! {
    #[test]
    fn aggregate_equals_sum_of_processor_counters(
        counters in prop::collection::vec((0u64..10_000, 0u64..10_000, 0u64..10_000), 0..16)
    ) {
        let metrics: Vec<ProcessorMetrics> = counters
            .iter()
            .map(|&(processed, warnings, errors)| ProcessorMetrics {
                number_of_processed_events: processed,
                number_of_warnings: warnings,
                number_of_errors: errors,
            })
            .collect();

        let snapshot = MetricsSnapshot::aggregate(metrics.iter());

        let expected_processed: u64 = counters.iter().map(|c| c.0).sum();
        let expected_warnings: u64 = counters.iter().map(|c| c.1).sum();
        let expected_errors: u64 = counters.iter().map(|c| c.2).sum();
        prop_assert_eq!(snapshot.number_of_processed_events, expected_processed);
        prop_assert_eq!(snapshot.number_of_warnings, expected_warnings);
        prop_assert_eq!(snapshot.number_of_errors, expected_errors);
    }

    #[test]
    fn concurrent_counter_increments_are_never_lost(
        threads in 1usize..6,
        increments in 1usize..200,
    ) {
        let counter = SharedCounter::new();
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..increments {
                        counter.increment();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("increment thread must not panic");
        }
        prop_assert_eq!(counter.value(), (threads * increments) as u64);
    }
}
