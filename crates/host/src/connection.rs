//! Host connection (C7's transport): the client side of the wire protocol.
//!
//! Connects out to the host's listening socket (never the other way
//! around — confirmed against the original `TPClientQt::connect` call,
//! which opens a `QTcpSocket` toward a configurable `tpHost`/`tpPort`),
//! sends the `pair` handshake, then pumps [`HostInput`]/[`HostOutput`]
//! through the bridge until the host closes the socket, `closePlugin` is
//! processed, or the caller's `shutdown` token fires.

use crate::bridge::HostBridge;
use crate::error::HostError;
use crate::messages::HostInput;
use crate::wire::{self, ProtocolError};
use dsep_core::{Clock, HostOutput};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 12136;

/// Minimum spacing enforced between queued writes when the send queue is
/// enabled, serializing bursts instead of writing them back to back.
const SEND_QUEUE_SPACING: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub plugin_id: String,
    pub send_queue_enabled: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            plugin_id: String::new(),
            send_queue_enabled: false,
        }
    }
}

impl ConnectionConfig {
    /// Apply a `-t/--tphost` value of `HOST` or `HOST:PORT`. A missing or
    /// unparseable port keeps whatever port was already set.
    pub fn with_tphost(mut self, tphost: &str) -> Self {
        match tphost.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() => {
                self.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.port = port;
                }
            }
            _ => self.host = tphost.to_string(),
        }
        self
    }
}

/// Connect to the host and run the read/write pump to completion.
pub async fn run<C: Clock + 'static>(
    config: &ConnectionConfig,
    bridge: Arc<HostBridge<C>>,
    shutdown: CancellationToken,
) -> Result<(), HostError> {
    let addr = format!("{}:{}", config.host, config.port);
    let stream = TcpStream::connect(&addr).await?;
    stream.set_nodelay(true)?;
    info!(%addr, "connected to host");

    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let (tx, rx) = mpsc::unbounded_channel::<HostOutput>();

    let writer = tokio::spawn(run_writer(write_half, rx, config.send_queue_enabled));

    if tx.send(HostOutput::Pair { id: config.plugin_id.clone() }).is_err() {
        return Err(HostError::NotConnected);
    }

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                info!("shutdown requested, closing host connection");
                break;
            }
            received = wire::read_json::<_, HostInput>(&mut reader) => {
                match received {
                    Ok(msg) => {
                        let is_close = matches!(msg, HostInput::ClosePlugin {});
                        for out in bridge.handle(msg).await? {
                            if tx.send(out).is_err() {
                                break;
                            }
                        }
                        if is_close {
                            break;
                        }
                    }
                    Err(ProtocolError::ConnectionClosed) => {
                        info!("host closed the connection");
                        break;
                    }
                    Err(err) => {
                        warn!(%err, "malformed message from host, skipping");
                    }
                }
            }
        }
    }

    drop(tx);
    let _ = writer.await;
    Ok(())
}

async fn run_writer(
    mut write_half: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<HostOutput>,
    spaced: bool,
) {
    let mut last_sent = tokio::time::Instant::now();
    let mut first = true;
    while let Some(msg) = rx.recv().await {
        if spaced && !first {
            let elapsed = last_sent.elapsed();
            if elapsed < SEND_QUEUE_SPACING {
                tokio::time::sleep(SEND_QUEUE_SPACING - elapsed).await;
            }
        }
        first = false;
        if let Err(err) = wire::write_json(&mut write_half, &msg).await {
            warn!(%err, "host write failed, closing connection");
            break;
        }
        last_sent = tokio::time::Instant::now();
    }
    let _ = write_half.shutdown().await;
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
