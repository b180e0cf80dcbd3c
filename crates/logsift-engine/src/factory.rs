//! Factories building connectors and processors from type-tagged
//! configuration blocks.
//!
//! One connector block yields the input/output pair for a single pipeline;
//! the engine calls back into these factories when it rebuilds a pipeline
//! after a fatal connector error, so creation must be repeatable.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::types::{ConnectorConfig, ProcessorConfig};
use crate::connector::jsonl::{JsonlInput, JsonlInputConfig, JsonlOutput, JsonlOutputConfig};
use crate::connector::memory::{MemoryInput, MemoryOutput};
use crate::connector::{Input, Output};
use crate::processors::deleter::{Deleter, DeleterConfig};
use crate::processors::Processor;

/// Connector type tags the factory can build.
pub const CONNECTOR_TYPES: &[&str] = &["memory", "jsonl"];

/// Processor type tags the factory can build.
pub const PROCESSOR_TYPES: &[&str] = &["deleter"];

/// Failure while building connectors or processors from configuration.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("unknown connector type '{kind}'")]
    UnknownConnectorType { kind: String },

    #[error("unknown processor type '{kind}'")]
    UnknownProcessorType { kind: String },

    #[error("invalid configuration for '{kind}': {source}")]
    InvalidConfig {
        kind: String,
        #[source]
        source: anyhow::Error,
    },
}

#[must_use]
pub fn is_known_connector_type(kind: &str) -> bool {
    CONNECTOR_TYPES.contains(&kind)
}

#[must_use]
pub fn is_known_processor_type(kind: &str) -> bool {
    PROCESSOR_TYPES.contains(&kind)
}

fn parse_options<T: DeserializeOwned>(
    kind: &str,
    options: &serde_json::Map<String, Value>,
) -> Result<T, FactoryError> {
    serde_json::from_value(Value::Object(options.clone())).map_err(|err| {
        FactoryError::InvalidConfig {
            kind: kind.to_string(),
            source: err.into(),
        }
    })
}

/// Build the input/output connector pair for one pipeline.
///
/// # Errors
///
/// Fails for unknown type tags or connector options that do not deserialize.
pub fn create_connectors(
    config: &ConnectorConfig,
) -> Result<(Box<dyn Input>, Box<dyn Output>), FactoryError> {
    match config.kind.as_str() {
        "memory" => {
            let documents = match config.options.get("input") {
                Some(Value::Array(items)) => items.clone(),
                Some(other) => {
                    return Err(FactoryError::InvalidConfig {
                        kind: config.kind.clone(),
                        source: anyhow::anyhow!("'input' must be a list, got {other}"),
                    })
                }
                None => Vec::new(),
            };
            let (output, _handle) = MemoryOutput::new();
            Ok((Box::new(MemoryInput::new(documents)), Box::new(output)))
        }
        "jsonl" => {
            let input_config: JsonlInputConfig = parse_options(&config.kind, &config.options)?;
            let output_config: JsonlOutputConfig = parse_options(&config.kind, &config.options)?;
            Ok((
                Box::new(JsonlInput::new(input_config)),
                Box::new(JsonlOutput::new(output_config)),
            ))
        }
        _ => Err(FactoryError::UnknownConnectorType {
            kind: config.kind.clone(),
        }),
    }
}

/// Build one processor from its configuration block.
///
/// # Errors
///
/// Fails for unknown type tags or processor options that do not deserialize.
pub fn create_processor(config: &ProcessorConfig) -> Result<Box<dyn Processor>, FactoryError> {
    match config.kind.as_str() {
        "deleter" => {
            let options: DeleterConfig = parse_options(&config.kind, &config.options)?;
            Ok(Box::new(Deleter::new(config.name.clone(), options)))
        }
        _ => Err(FactoryError::UnknownProcessorType {
            kind: config.kind.clone(),
        }),
    }
}

/// Build the ordered processor chain.
///
/// # Errors
///
/// Fails on the first processor block that cannot be built.
pub fn create_processor_chain(
    configs: &[ProcessorConfig],
) -> Result<Vec<Box<dyn Processor>>, FactoryError> {
    configs.iter().map(create_processor).collect()
}
