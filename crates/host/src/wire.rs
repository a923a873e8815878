//! Newline-delimited JSON framing over an async byte stream.
//!
//! `encode`/`decode` are the raw JSON codec; `read_message`/`write_message`
//! add the line framing. One JSON object per line, UTF-8, no embedded
//! newlines — `serde_json::to_vec` never emits one for the message shapes
//! this crate serializes, so no escaping pass is needed before writing the
//! delimiter.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("connection closed")]
    ConnectionClosed,
}

/// Serialize `msg` to a single line of JSON, without the trailing newline.
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(msg)?)
}

/// Parse one line's worth of bytes (no trailing newline) as JSON.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write `payload` followed by a single `\n`.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), ProtocolError> {
    writer.write_all(payload).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Read one line, returning its bytes with the trailing newline stripped.
/// `Err(ConnectionClosed)` when the peer closes with no more data.
pub async fn read_message<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line).await?;
    if n == 0 {
        return Err(ProtocolError::ConnectionClosed);
    }
    while matches!(line.last(), Some(b'\n') | Some(b'\r')) {
        line.pop();
    }
    Ok(line)
}

/// Encode and frame a message in one call.
pub async fn write_json<W: AsyncWrite + Unpin, T: Serialize>(
    writer: &mut W,
    msg: &T,
) -> Result<(), ProtocolError> {
    write_message(writer, &encode(msg)?).await
}

/// Read one framed line and decode it.
pub async fn read_json<R: AsyncBufRead + Unpin, T: DeserializeOwned>(
    reader: &mut R,
) -> Result<T, ProtocolError> {
    let line = read_message(reader).await?;
    decode(&line)
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
