use dsep_core::{DseError, ScriptErrorBoxed};
use thiserror::Error;

/// Errors raised by an engine's worker thread or its request channel.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine error on {engine}: {source}")]
    Script { engine: String, #[source] source: ScriptErrorBoxed },

    #[error("engine {0} worker thread is gone")]
    WorkerGone(String),

    #[error("engine {0} did not reply before shutdown")]
    NoReply(String),

    #[error("module path not found: {0}")]
    ModuleNotFound(String),
}

impl From<EngineError> for DseError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Script { engine, source } => DseError::EngineError { engine, source },
            other => DseError::EngineError { engine: String::new(), source: ScriptErrorBoxed::from(dsep_core::ScriptError::new(other.to_string())) },
        }
    }
}
