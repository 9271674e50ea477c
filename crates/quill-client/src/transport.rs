//! Relay transport.
//!
//! The controller only ever emits through [`Outbound`]. Inbound traffic
//! arrives as [`ServerMessage`]s on a channel. [`connect`] wires both ends
//! to a TCP socket speaking newline-delimited JSON envelopes:
//!
//! ```text
//!   Outbound (UnboundedSender) ──▶ writer task ──▶ ┐
//!                                                   ├── TcpStream ── relay
//!   inbound (UnboundedReceiver) ◀── reader task ◀── ┘
//! ```

use futures::{SinkExt, StreamExt};
use quill_types::{ClientMessage, ServerMessage, WireError};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

use crate::constants::MAX_LINE_LENGTH;

/// Errors from the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("framing error: {0}")]
    Codec(#[from] LinesCodecError),
    #[error("wire error: {0}")]
    Wire(#[from] WireError),
}

/// Where the controller's outbound named events go.
pub trait Outbound {
    fn emit(&mut self, message: ClientMessage) -> Result<(), TransportError>;
}

impl Outbound for mpsc::UnboundedSender<ClientMessage> {
    fn emit(&mut self, message: ClientMessage) -> Result<(), TransportError> {
        self.send(message).map_err(|_| TransportError::Closed)
    }
}

/// Both ends of a live relay connection.
pub struct Connection {
    pub outbound: mpsc::UnboundedSender<ClientMessage>,
    pub inbound: mpsc::UnboundedReceiver<ServerMessage>,
}

/// Connect to a relay at `addr` (`host:port`).
///
/// Spawns a reader and a writer task on the current runtime. The reader ends
/// when the socket closes or the inbound receiver is dropped; the writer ends
/// when every outbound sender is dropped.
pub async fn connect(addr: &str) -> Result<Connection, TransportError> {
    let stream = TcpStream::connect(addr).await?;
    info!("connected to relay at {}", addr);

    let (read_half, write_half) = stream.into_split();
    let mut reader = FramedRead::new(read_half, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));
    let mut writer = FramedWrite::new(write_half, LinesCodec::new());

    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientMessage>();

    tokio::spawn(async move {
        while let Some(frame) = reader.next().await {
            let line = match frame {
                Ok(line) => line,
                Err(e) => {
                    warn!("relay read failed: {}", e);
                    break;
                }
            };
            match ServerMessage::from_line(&line) {
                Ok(message) => {
                    if in_tx.send(message).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("dropping unreadable relay message: {}", e),
            }
        }
        debug!("relay reader finished");
    });

    tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            let line = match message.to_line() {
                Ok(line) => line,
                Err(e) => {
                    warn!("failed to encode {} message: {}", message.event(), e);
                    continue;
                }
            };
            if let Err(e) = writer.send(line).await {
                warn!("relay write failed: {}", e);
                break;
            }
        }
        debug!("relay writer finished");
    });

    Ok(Connection {
        outbound: out_tx,
        inbound: in_rx,
    })
}
