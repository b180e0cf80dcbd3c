//! Semantic validation for parsed pipeline configuration values.

use anyhow::Result;

use crate::config::types::PipelineConfig;
use crate::factory;

/// Validate a parsed pipeline configuration.
/// Returns `Ok(())` if valid, Err with all validation errors if not.
///
/// # Errors
///
/// Returns an error listing all validation failures found in the pipeline
/// config.
pub fn validate_pipeline(config: &PipelineConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.process_count == 0 {
        errors.push("process_count must be at least 1".to_string());
    }

    if !(config.timeout.is_finite() && config.timeout > 0.0) {
        errors.push(format!(
            "timeout must be a positive number of seconds, got {}",
            config.timeout
        ));
    }

    if config.connector.kind.trim().is_empty() {
        errors.push("Connector type must not be empty".to_string());
    } else if !factory::is_known_connector_type(&config.connector.kind) {
        errors.push(format!(
            "Unknown connector type '{}', expected one of: {}",
            config.connector.kind,
            factory::CONNECTOR_TYPES.join(", ")
        ));
    }

    for (i, processor) in config.pipeline.iter().enumerate() {
        if processor.name.trim().is_empty() {
            errors.push(format!("Processor {i} has an empty name"));
        }
        if !factory::is_known_processor_type(&processor.kind) {
            errors.push(format!(
                "Processor '{}' has unknown type '{}', expected one of: {}",
                processor.name,
                processor.kind,
                factory::PROCESSOR_TYPES.join(", ")
            ));
        }
    }

    if config.metrics.enabled && config.metrics.period == 0 {
        errors.push("metrics.period must be > 0 when metrics are enabled".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Pipeline validation failed:\n  - {}", errors.join("\n  - "))
    }
}
