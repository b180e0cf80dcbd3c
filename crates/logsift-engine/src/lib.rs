//! Pipeline execution engine for logsift.
//!
//! The engine pulls events from a pluggable [`connector::Input`], pushes them
//! through an ordered chain of [`processors::Processor`]s, and pushes them to
//! a pluggable [`connector::Output`]. A layered recovery policy keeps a worker
//! alive through malformed events, transient connector failures, and fatal
//! connector failures: warnings skip one cycle, critical errors divert one
//! event to the failed-event sink, fatal errors rebuild the connectors and
//! processors in place without terminating the worker.

pub mod config;
pub mod connector;
pub mod counter;
pub mod error;
pub mod factory;
pub mod metrics;
pub mod pipeline;
pub mod preprocessing;
pub mod processors;
pub mod shared;
pub mod supervisor;

pub use error::PipelineError;
pub use pipeline::{Pipeline, StopHandle};
pub use supervisor::{PipelineWorker, Supervisor, WorkerContext};
