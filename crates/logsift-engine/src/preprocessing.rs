//! Event preprocessing applied between retrieval and the processor chain.

use serde_json::{json, Value};

use logsift_types::Event;

use crate::config::types::PreprocessingConfig;

/// Component name written into version-info objects.
pub const COMPONENT_NAME: &str = "logsift";

/// Running engine version written into version-info objects.
pub const COMPONENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Apply the configured preprocessing steps to one non-empty event.
///
/// Version-info injection: when a target field is configured and not already
/// present on the event, it is set to
/// `{"logsift": <running version>, "configuration": <config version>}` with
/// `"unset"` standing in for a missing configuration version. An existing
/// field at that path is never overwritten.
pub fn apply(config: &PreprocessingConfig, config_version: Option<&Value>, event: &mut Event) {
    if let Some(target_field) = &config.version_info_target_field {
        if !event.contains_field(target_field) {
            let configuration = config_version.cloned().unwrap_or_else(|| json!("unset"));
            event.insert(
                target_field.clone(),
                json!({
                    COMPONENT_NAME: COMPONENT_VERSION,
                    "configuration": configuration,
                }),
            );
        }
    }
}
