//! Shared error taxonomy.
//!
//! Each crate downstream wraps/propagates these through its own
//! `thiserror`-derived error type (`RuntimeError`-style), one enum per
//! crate; this is the vocabulary they share.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

/// A script-side error: an evaluation result that is error-shaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub name: String,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub stack: Option<String>,
    pub cause: Option<Box<ScriptError>>,
}

impl ScriptError {
    pub fn new(message: impl Into<String>) -> Self {
        ScriptError {
            name: "Error".to_string(),
            message: message.into(),
            file: None,
            line: None,
            stack: None,
            cause: None,
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: ScriptError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    #[must_use]
    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// Walk the cause chain, innermost last, for logging/wrapping.
    pub fn cause_chain(&self) -> Vec<&ScriptError> {
        let mut chain = vec![self];
        let mut cur = self;
        while let Some(cause) = &cur.cause {
            chain.push(cause);
            cur = cause;
        }
        chain
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)?;
        if let Some(file) = &self.file {
            write!(f, " ({file}:{})", self.line.unwrap_or(0))?;
        }
        Ok(())
    }
}

impl std::error::Error for ScriptError {}

/// Top-level error taxonomy shared across crates.
#[derive(Debug, Error)]
pub enum DseError {
    /// Setter validation failure: empty expression, bad enum value, etc.
    /// The instance remains in the registry for a subsequent corrective update.
    #[error("VALIDATION ERROR: {0}")]
    PropertyError(String),

    /// Missing or unreadable script file.
    #[error("VALIDATION ERROR: file load failed: {0}")]
    FileLoadError(String),

    /// Runtime error raised during evaluation, with full instance context.
    #[error("script error in instance {instance}: {source}")]
    ScriptError { instance: String, #[source] source: ScriptErrorBoxed },

    /// Uncaught host-API error or engine reset failure, with no owning instance.
    #[error("engine error on {engine}: {source}")]
    EngineError { engine: String, #[source] source: ScriptErrorBoxed },

    /// Malformed host message; logged and ignored, never raised to a script.
    #[error("malformed host message: {0}")]
    HostProtocolError(String),

    /// Unknown settings version or corrupt persisted record.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Per-instance or per-engine lock could not be acquired within the timeout.
    #[error("lock acquire timed out after {0:?}")]
    LockTimeout(std::time::Duration),
}

/// `ScriptError` wrapped so it can sit behind `#[source]` (which requires
/// `std::error::Error + 'static`); `ScriptError` itself already implements
/// `Error`, this newtype just satisfies orphan/dyn-compat rules cleanly.
#[derive(Debug)]
pub struct ScriptErrorBoxed(pub Box<ScriptError>);

impl fmt::Display for ScriptErrorBoxed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ScriptErrorBoxed {}

impl From<ScriptError> for ScriptErrorBoxed {
    fn from(e: ScriptError) -> Self {
        ScriptErrorBoxed(Box::new(e))
    }
}

/// Monotonically increasing `error-count` host state, with formatted
/// `lastError` text: a 3-digit sequence number, wall-clock time, instance
/// name, and message.
#[derive(Debug, Default)]
pub struct ErrorCounter {
    count: AtomicU32,
}

impl ErrorCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Bump the counter and format the `lastError` text for the given
    /// instance (or `"-"` for engine-level errors with no owning instance)
    /// and wall-clock epoch milliseconds.
    pub fn record(&self, instance: &str, message: &str, epoch_ms: u64) -> String {
        let seq = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        format!("[{seq:03}] t={epoch_ms} instance={instance} {message}")
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
