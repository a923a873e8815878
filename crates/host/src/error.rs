//! Top-level error taxonomy for `dsep-host`, wrapping the shared
//! [`dsep_core::DseError`] vocabulary plus this crate's own I/O, wire, and
//! persistence failure modes.

use crate::wire::ProtocolError;
use dsep_core::DseError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Core(#[from] DseError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("host connection closed before it could be used")]
    NotConnected,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
