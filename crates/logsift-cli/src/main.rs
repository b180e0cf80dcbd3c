mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "logsift",
    version,
    about = "Rule-driven log and event processing pipelines"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline worker fleet until interrupted
    Run {
        /// Path to pipeline YAML file
        config: PathBuf,
        /// Override the configured worker count
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Validate a pipeline configuration
    Check {
        /// Path to pipeline YAML file
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    match cli.command {
        Commands::Run { config, workers } => commands::run::execute(&config, workers).await,
        Commands::Check { config } => commands::check::execute(&config),
    }
}
