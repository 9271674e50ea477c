//! TCP front end for the relay.
//!
//! One task per connection. The read half feeds [`Relay::broadcast`]; a
//! writer task drains the site's outbox onto the write half. Lines that do
//! not parse as a [`ClientMessage`] are logged and skipped.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use quill_types::ClientMessage;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::constants::MAX_LINE_LENGTH;
use crate::error::Result;
use crate::relay::Relay;

/// Bind the listener described by `config`.
pub async fn bind(config: &RelayConfig) -> Result<TcpListener> {
    let listener = TcpListener::bind(config.listen_addr()).await?;
    info!("relay listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accept connections forever.
pub async fn serve(listener: TcpListener, relay: Arc<Relay>) -> Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        let relay = relay.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, addr, relay).await {
                error!("connection from {} failed: {}", addr, e);
            }
        });
    }
}

async fn handle_connection(stream: TcpStream, addr: SocketAddr, relay: Arc<Relay>) -> Result<()> {
    let peer = relay.join()?;
    let site_id = peer.site_id;
    let mut outbox = peer.outbox;
    info!("site {} connected from {}", site_id, addr);

    let (read_half, write_half) = stream.into_split();
    let mut lines = FramedRead::new(read_half, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));
    let mut sink = FramedWrite::new(write_half, LinesCodec::new());

    let writer = tokio::spawn(async move {
        while let Some(message) = outbox.recv().await {
            let line = match message.to_line() {
                Ok(line) => line,
                Err(e) => {
                    warn!("failed to encode {} for site {}: {}", message.event(), site_id, e);
                    continue;
                }
            };
            if let Err(e) = sink.send(line).await {
                debug!("write to site {} failed: {}", site_id, e);
                break;
            }
        }
    });

    let mut result = Ok(());
    while let Some(frame) = lines.next().await {
        let line = match frame {
            Ok(line) => line,
            Err(e) => {
                result = Err(e.into());
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match ClientMessage::from_line(&line) {
            Ok(ClientMessage::TextOperations(batch)) => {
                relay.broadcast(site_id, batch);
            }
            Err(e) => warn!("skipping malformed line from site {}: {}", site_id, e),
        }
    }

    relay.leave(site_id);
    // Dropping the relay's sender ends the writer once the outbox drains.
    let _ = writer.await;
    info!("site {} disconnected", site_id);
    result
}
