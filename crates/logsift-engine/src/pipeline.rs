//! The per-worker event loop: retrieve → preprocess → process → store, with
//! layered error recovery.
//!
//! Every failure crossing into the engine is classified by severity.
//! Warnings skip the current cycle; critical errors divert exactly one event
//! to the failed-event sink and the loop continues; fatal connector errors
//! shut down and rebuild the connectors and processors in place; the worker
//! itself keeps running. Events in flight when a fatal error strikes are
//! accepted loss.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use logsift_types::{Event, ExtraOutputs, InputError, MetricsSnapshot, OutputError, ProcessorError};

use crate::config::types::PipelineConfig;
use crate::connector::{Input, Output};
use crate::counter::SharedCounter;
use crate::error::PipelineError;
use crate::factory;
use crate::metrics::MetricsReporter;
use crate::preprocessing;
use crate::processors::Processor;
use crate::shared::SharedMap;
use crate::supervisor::WorkerContext;

/// Handle to cooperatively stop a running pipeline from another thread.
///
/// Stopping is sticky: a pipeline stopped before its `run()` loop starts will
/// not enter the loop at all.
#[derive(Clone)]
pub struct StopHandle {
    flags: Arc<RunFlags>,
}

impl StopHandle {
    /// Clear the iterate flag; the in-flight cycle always completes.
    pub fn stop(&self) {
        self.flags.stop();
    }
}

#[derive(Default)]
struct RunFlags {
    iterate: AtomicBool,
    stop_requested: AtomicBool,
}

impl RunFlags {
    fn enable_iteration(&self) {
        if !self.stop_requested.load(Ordering::SeqCst) {
            self.iterate.store(true, Ordering::SeqCst);
        }
    }

    fn iterate(&self) -> bool {
        self.iterate.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.iterate.store(false, Ordering::SeqCst);
    }
}

enum CycleOutcome {
    Continue,
    Rebuild,
}

/// One worker's pipeline: exactly one input, one output, and an ordered
/// processor chain, driven by a single-threaded synchronous loop.
pub struct Pipeline {
    index: usize,
    config: Arc<PipelineConfig>,
    counter: SharedCounter,
    lock: Arc<Mutex<()>>,
    shared: SharedMap,
    input: Option<Box<dyn Input>>,
    output: Option<Box<dyn Output>>,
    processors: Vec<Box<dyn Processor>>,
    flags: Arc<RunFlags>,
    reporter: MetricsReporter,
    stored_count: u64,
}

impl Pipeline {
    /// Construct a pipeline for worker `index`. Connectors and processors are
    /// built lazily by [`Pipeline::setup`].
    #[must_use]
    pub fn new(index: usize, config: Arc<PipelineConfig>, ctx: WorkerContext) -> Self {
        let reporter = MetricsReporter::new(&config.metrics);
        Self {
            index,
            counter: ctx.counter,
            lock: ctx.lock,
            shared: ctx.shared,
            input: None,
            output: None,
            processors: Vec::new(),
            flags: Arc::new(RunFlags::default()),
            reporter,
            stored_count: 0,
            config,
        }
    }

    /// Worker ordinal this pipeline runs as.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Build connectors and processors if absent, then set everything up.
    ///
    /// Creation is a separate, re-invokable step: the fatal-error rebuild
    /// calls back into the same factories.
    ///
    /// # Errors
    ///
    /// Fails when a component cannot be built from configuration or its own
    /// `setup` fails.
    pub fn setup(&mut self) -> Result<(), PipelineError> {
        if self.input.is_none() || self.output.is_none() {
            let (input, output) = factory::create_connectors(&self.config.connector)?;
            self.input = Some(input);
            self.output = Some(output);
            self.processors = factory::create_processor_chain(&self.config.pipeline)?;
        }
        if let Some(input) = self.input.as_mut() {
            input.setup().map_err(PipelineError::InputSetup)?;
        }
        if let Some(output) = self.output.as_mut() {
            output.setup().map_err(PipelineError::OutputSetup)?;
        }
        for processor in &mut self.processors {
            let name = processor.name().to_string();
            processor
                .setup()
                .map_err(|source| PipelineError::ProcessorSetup { name, source })?;
        }
        Ok(())
    }

    /// Shut down every owned component. Idempotent.
    pub fn shut_down(&mut self) {
        if let Some(input) = self.input.as_mut() {
            input.shut_down();
        }
        if let Some(output) = self.output.as_mut() {
            output.shut_down();
        }
        for processor in &mut self.processors {
            processor.shut_down();
        }
    }

    /// Run the event loop until [`Pipeline::stop`] (or a [`StopHandle`])
    /// clears the iterate flag. Never panics out of the loop; every connector
    /// and processor failure is classified and recovered per the taxonomy.
    pub fn run(&mut self) {
        let span = tracing::info_span!("pipeline", worker = self.index);
        let _entered = span.enter();

        if let Err(err) = self.setup() {
            tracing::error!(error = %err, "pipeline setup failed");
            return;
        }
        self.counter
            .setup(Duration::from_secs(self.config.print_processed_period));
        self.enable_iteration();
        tracing::debug!("pipeline started");
        while self.iterate() {
            self.process_cycle();
        }
        self.shut_down();
        tracing::debug!("pipeline stopped");
    }

    /// Allow the loop to run. A previously requested stop is sticky and wins.
    pub fn enable_iteration(&self) {
        self.flags.enable_iteration();
    }

    /// Returns `true` while the loop should keep cycling.
    #[must_use]
    pub fn iterate(&self) -> bool {
        self.flags.iterate()
    }

    /// Clear the iterate flag; the in-flight cycle always completes.
    pub fn stop(&self) {
        self.flags.stop();
    }

    /// Handle for stopping this pipeline from another thread.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            flags: self.flags.clone(),
        }
    }

    /// Pipeline-wide metrics, summed over the current processor chain on
    /// every call.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot::aggregate(self.processors.iter().map(|p| p.metrics()))
    }

    /// Execute one retrieve→preprocess→process→store cycle.
    pub fn process_cycle(&mut self) {
        if self.input.is_none() || self.output.is_none() {
            // A failed rebuild left the pipeline without components; retry
            // and back off for one poll interval while the fault persists.
            if let Err(err) = self.setup() {
                tracing::error!(worker = self.index, error = %err, "pipeline setup failed");
                std::thread::sleep(self.config.timeout_duration());
                return;
            }
        }
        if let CycleOutcome::Rebuild = self.run_cycle() {
            self.rebuild();
        }
        if self.reporter.is_due() {
            let snapshot = self.metrics();
            self.reporter
                .report(self.index, snapshot, &self.lock, &self.shared);
        }
    }

    fn run_cycle(&mut self) -> CycleOutcome {
        let worker = self.index;
        let timeout = self.config.timeout_duration();
        let (input, output) = match (self.input.as_mut(), self.output.as_mut()) {
            (Some(input), Some(output)) => (input, output),
            _ => return CycleOutcome::Continue,
        };
        let input_endpoint = input.describe_endpoint();
        let output_endpoint = output.describe_endpoint();

        let mut event = match input.get_next(timeout) {
            Ok(event) => event,
            Err(InputError::SourceDisconnected) => {
                tracing::warn!(
                    worker,
                    "Lost or failed to establish connection to {input_endpoint}"
                );
                return CycleOutcome::Continue;
            }
            Err(InputError::Warning(message)) => {
                tracing::warn!(
                    worker,
                    "An error occurred for input {input_endpoint}: {message}"
                );
                return CycleOutcome::Continue;
            }
            Err(InputError::Critical { message, payload }) => {
                tracing::error!(
                    worker,
                    "A critical error occurred for input {input_endpoint}: {message}"
                );
                Self::divert_to_failed(output.as_mut(), &message, payload, Event::new());
                return CycleOutcome::Continue;
            }
            Err(InputError::Fatal(message)) => {
                tracing::error!(worker, "Input {input_endpoint} failed: {message}");
                return CycleOutcome::Rebuild;
            }
        };

        // Raw payload as retrieved, kept for the failed-event sink.
        let original = event.to_value();

        if !event.is_empty() {
            preprocessing::apply(
                &self.config.connector.consumer.preprocessing,
                self.config.version.as_ref(),
                &mut event,
            );
        }

        // Empty events never reach processors or the output.
        let mut dropped = false;
        if !event.is_empty() {
            for processor in self.processors.iter_mut() {
                match processor.process(&mut event) {
                    Ok(extra) => {
                        if let CycleOutcome::Rebuild = Self::forward_extra_outputs(
                            worker,
                            output.as_mut(),
                            &output_endpoint,
                            &extra,
                        ) {
                            return CycleOutcome::Rebuild;
                        }
                    }
                    Err(ProcessorError::Warning(message)) => {
                        tracing::warn!(
                            worker,
                            "A warning occurred for processor {}: {message}",
                            processor.name()
                        );
                    }
                    Err(ProcessorError::Critical(source)) => {
                        tracing::error!(
                            worker,
                            "A critical error occurred for processor {}, storing event in failed event output: {source}",
                            processor.name()
                        );
                        Self::divert_to_failed(
                            output.as_mut(),
                            &source.to_string(),
                            original.clone(),
                            event.clone(),
                        );
                        dropped = true;
                        break;
                    }
                }
                if event.is_empty() {
                    break;
                }
            }
        }

        let mut stored = false;
        if !dropped && !event.is_empty() {
            match output.store(event) {
                Ok(()) => stored = true,
                Err(OutputError::Warning(message)) => {
                    tracing::warn!(
                        worker,
                        "An error occurred for output {output_endpoint}: {message}"
                    );
                }
                Err(OutputError::Critical { message, event }) => {
                    tracing::error!(
                        worker,
                        "A critical error occurred for output {output_endpoint}: {message}"
                    );
                    Self::divert_to_failed(
                        output.as_mut(),
                        &message,
                        event.into_value(),
                        Event::new(),
                    );
                }
                Err(OutputError::Fatal(message)) => {
                    tracing::error!(worker, "Output {output_endpoint} failed: {message}");
                    return CycleOutcome::Rebuild;
                }
            }
        }

        if stored {
            self.counter.increment();
            self.stored_count += 1;
            {
                let _guard = self
                    .lock
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                self.shared
                    .insert(format!("pipeline-{worker}.stored"), json!(self.stored_count));
            }
        }

        // Commit input progress once per cycle, after the store phase.
        if let Err(err) = input.batch_finished_callback() {
            tracing::warn!(
                worker,
                "batch acknowledgment failed for input {input_endpoint}: {err}"
            );
        }

        CycleOutcome::Continue
    }

    fn forward_extra_outputs(
        worker: usize,
        output: &mut dyn Output,
        output_endpoint: &str,
        extra: &ExtraOutputs,
    ) -> CycleOutcome {
        for batch in extra.iter() {
            for document in &batch.documents {
                match output.store_custom(document.clone(), &batch.target) {
                    Ok(()) => {}
                    Err(OutputError::Warning(message)) => {
                        tracing::warn!(
                            worker,
                            "An error occurred for output {output_endpoint}: {message}"
                        );
                    }
                    Err(OutputError::Critical { message, event }) => {
                        tracing::error!(
                            worker,
                            "A critical error occurred for output {output_endpoint}: {message}"
                        );
                        Self::divert_to_failed(output, &message, event.into_value(), Event::new());
                    }
                    Err(OutputError::Fatal(message)) => {
                        tracing::error!(worker, "Output {output_endpoint} failed: {message}");
                        return CycleOutcome::Rebuild;
                    }
                }
            }
        }
        CycleOutcome::Continue
    }

    fn divert_to_failed(
        output: &mut dyn Output,
        error_message: &str,
        original: Value,
        processed: Event,
    ) {
        if let Err(err) = output.store_failed(error_message, original, processed) {
            tracing::error!(error = %err, "failed to persist failed event");
        }
    }

    /// Tear down and reconstruct the owned connectors and processors. The
    /// iterate flag is untouched and the worker keeps running on the fresh
    /// components.
    fn rebuild(&mut self) {
        tracing::info!(
            worker = self.index,
            "rebuilding connectors and processors after fatal error"
        );
        self.shut_down();
        self.input = None;
        self.output = None;
        self.processors.clear();
        if let Err(err) = self.setup() {
            tracing::error!(worker = self.index, error = %err, "pipeline rebuild failed");
        }
    }
}
