//! Serde model for the pipeline configuration file.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level pipeline configuration.
///
/// One immutable snapshot is shared by every worker; connector- and
/// processor-specific keys stay opaque to the engine and are interpreted by
/// the factories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Configuration version identifier, echoed into version-info
    /// preprocessing.
    #[serde(default)]
    pub version: Option<Value>,
    /// Number of worker pipelines to run.
    #[serde(default = "default_process_count")]
    pub process_count: usize,
    /// Per-cycle input poll timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: f64,
    /// Period of the shared-counter status report, in seconds.
    #[serde(default = "default_print_processed_period")]
    pub print_processed_period: u64,
    /// Type-tagged connector block consumed by the connector factory.
    pub connector: ConnectorConfig,
    /// Ordered processor chain.
    #[serde(default)]
    pub pipeline: Vec<ProcessorConfig>,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl PipelineConfig {
    /// The input poll timeout as a `Duration`.
    #[must_use]
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }
}

/// Type-tagged connector configuration block.
///
/// The factory builds the input/output pair from `kind` and the flattened
/// connector-specific keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub consumer: ConsumerConfig,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsumerConfig {
    #[serde(default)]
    pub preprocessing: PreprocessingConfig,
}

/// Preprocessing applied to every non-empty event before the chain runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Field receiving the version-info object; nothing is injected when
    /// unset, and an existing field is never overwritten.
    #[serde(default)]
    pub version_info_target_field: Option<String>,
    /// Opaque HMAC preprocessing block, carried but not interpreted by the
    /// engine.
    #[serde(default)]
    pub hmac: Option<Value>,
}

/// One entry of the ordered processor chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Instance name used in log lines.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Reporting period in seconds.
    #[serde(default = "default_metrics_period")]
    pub period: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            period: default_metrics_period(),
        }
    }
}

fn default_process_count() -> usize {
    1
}

fn default_timeout() -> f64 {
    5.0
}

fn default_print_processed_period() -> u64 {
    300
}

fn default_metrics_period() -> u64 {
    10
}
