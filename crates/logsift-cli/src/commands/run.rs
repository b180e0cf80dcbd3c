use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use logsift_engine::config::{parser, validator};
use logsift_engine::supervisor::{Supervisor, WorkerContext};

/// Run the worker fleet until a shutdown signal arrives.
pub async fn execute(config_path: &Path, workers: Option<usize>) -> Result<()> {
    let mut config = parser::parse_pipeline(config_path)?;
    if let Some(workers) = workers {
        config.process_count = workers;
    }
    validator::validate_pipeline(&config)?;

    let ctx = WorkerContext::new();
    let mut supervisor = Supervisor::new(Arc::new(config), ctx);
    supervisor.start_all();
    tracing::info!(
        workers = supervisor.worker_count(),
        "pipeline running, press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("shutdown signal received, stopping workers");

    supervisor.stop_all();
    tokio::task::spawn_blocking(move || {
        supervisor.join_all();
        supervisor
    })
    .await
    .context("worker join task panicked")?;
    tracing::info!("all workers stopped");

    Ok(())
}
