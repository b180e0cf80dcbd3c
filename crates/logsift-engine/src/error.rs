//! Pipeline setup and rebuild error model.

use logsift_types::{InputError, OutputError, ProcessorError};

use crate::factory::FactoryError;

/// Failure while constructing or setting up a pipeline's components.
///
/// Errors raised *during* event processing never surface as this type; the
/// cycle classifies and recovers from them internally (warnings skip the
/// cycle, critical errors divert one event, fatal errors rebuild in place).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A connector or processor could not be built from its configuration.
    #[error(transparent)]
    Factory(#[from] FactoryError),

    /// The input connector failed to set up.
    #[error("input setup failed: {0}")]
    InputSetup(InputError),

    /// The output connector failed to set up.
    #[error("output setup failed: {0}")]
    OutputSetup(OutputError),

    /// A processor failed to set up.
    #[error("processor '{name}' setup failed: {source}")]
    ProcessorSetup {
        name: String,
        #[source]
        source: ProcessorError,
    },
}
