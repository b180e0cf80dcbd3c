//! Worker supervision: one OS thread per pipeline, shared primitives
//! injected from the outside.
//!
//! The supervisor holds no event-processing logic; it is pure lifecycle
//! management, so adding or removing workers never touches the event loop.
//! All cross-worker state travels through [`WorkerContext`]; its members are
//! `Send + Sync`, which is what lets the same instances be handed to every
//! worker thread (and lets the process-wide `tracing` subscriber accept
//! records from all of them).

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::config::types::PipelineConfig;
use crate::counter::SharedCounter;
use crate::pipeline::{Pipeline, StopHandle};
use crate::shared::SharedMap;

/// Cross-worker primitives, cloned into every worker's pipeline unmodified.
#[derive(Clone)]
pub struct WorkerContext {
    /// Monotonic processed-event counter shared by all workers.
    pub counter: SharedCounter,
    /// Lock guarding compound updates to shared state.
    pub lock: Arc<Mutex<()>>,
    /// Worker-keyed back-channel visible to the supervisor.
    pub shared: SharedMap,
}

impl WorkerContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            counter: SharedCounter::new(),
            lock: Arc::new(Mutex::new(())),
            shared: SharedMap::new(),
        }
    }
}

impl Default for WorkerContext {
    fn default() -> Self {
        Self::new()
    }
}

/// One pipeline on one dedicated, named OS thread.
pub struct PipelineWorker {
    index: usize,
    pipeline: Option<Pipeline>,
    stop: StopHandle,
    handle: Option<JoinHandle<()>>,
}

impl PipelineWorker {
    /// Construct the worker and its pipeline; nothing runs until
    /// [`PipelineWorker::start`].
    #[must_use]
    pub fn new(index: usize, config: Arc<PipelineConfig>, ctx: WorkerContext) -> Self {
        let pipeline = Pipeline::new(index, config, ctx);
        let stop = pipeline.stop_handle();
        Self {
            index,
            pipeline: Some(pipeline),
            stop,
            handle: None,
        }
    }

    /// Worker ordinal.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Spawn the worker thread. Idempotent: calling twice never spawns a
    /// duplicate, and a worker that already ran to completion stays stopped.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            tracing::debug!(worker = self.index, "worker already started");
            return;
        }
        let Some(mut pipeline) = self.pipeline.take() else {
            tracing::debug!(worker = self.index, "worker already ran to completion");
            return;
        };
        let spawned = std::thread::Builder::new()
            .name(format!("pipeline-{}", self.index))
            .spawn(move || pipeline.run());
        match spawned {
            Ok(handle) => self.handle = Some(handle),
            Err(err) => {
                tracing::error!(worker = self.index, error = %err, "failed to spawn worker thread");
            }
        }
    }

    /// Ask the owned pipeline to stop after its in-flight cycle. Sticky:
    /// effective even if the thread has not reached its run loop yet.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Block until the worker thread has exited.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!(worker = self.index, "worker thread panicked");
            }
        }
    }

    /// Returns `true` while the worker thread is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

/// Owns N workers, each running one independent pipeline over the same
/// configuration snapshot and shared context.
pub struct Supervisor {
    workers: Vec<PipelineWorker>,
    ctx: WorkerContext,
}

impl Supervisor {
    /// Create `config.process_count` workers sharing `ctx`.
    #[must_use]
    pub fn new(config: Arc<PipelineConfig>, ctx: WorkerContext) -> Self {
        let workers = (0..config.process_count)
            .map(|index| PipelineWorker::new(index, config.clone(), ctx.clone()))
            .collect();
        Self { workers, ctx }
    }

    /// Start every worker.
    pub fn start_all(&mut self) {
        for worker in &mut self.workers {
            worker.start();
        }
        tracing::info!(workers = self.workers.len(), "pipeline workers started");
    }

    /// Signal every worker to stop after its in-flight cycle.
    pub fn stop_all(&self) {
        for worker in &self.workers {
            worker.stop();
        }
        tracing::info!("stop signalled to all pipeline workers");
    }

    /// Block until every worker thread has exited.
    pub fn join_all(&mut self) {
        for worker in &mut self.workers {
            worker.join();
        }
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Number of workers whose threads are currently alive.
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.workers.iter().filter(|w| w.is_running()).count()
    }

    /// The shared context handed to every worker.
    #[must_use]
    pub fn context(&self) -> &WorkerContext {
        &self.ctx
    }
}
