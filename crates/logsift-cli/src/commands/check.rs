use std::path::Path;

use anyhow::Result;

use logsift_engine::config::{parser, validator};

/// Parse and validate a pipeline configuration.
pub fn execute(config_path: &Path) -> Result<()> {
    let config = parser::parse_pipeline(config_path)?;
    validator::validate_pipeline(&config)?;

    println!(
        "Configuration OK: connector '{}', {} processor(s), {} worker(s)",
        config.connector.kind,
        config.pipeline.len(),
        config.process_count
    );
    Ok(())
}
