//! Session actor: one [`SyncController`] driven by a tokio task.
//!
//! ```text
//!   SessionHandle ──mpsc──▶ ┐
//!   surface notifier ─────▶ ├── select! ── SyncController
//!   relay inbound ────────▶ │
//!   debounce deadline ────▶ ┘
//! ```
//!
//! Every `select!` arm calls exactly one controller handler and finishes
//! before the next arm runs, so the controller sees the same run-to-completion
//! discipline it would in a single-threaded event loop.

use quill_types::{ServerMessage, SiteId};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, trace, warn};

use crate::config::ClientConfig;
use crate::lifecycle::Lifecycle;
use crate::surface::{ChangeNotifier, EditingSurface};
use crate::sync::{SyncController, SyncStats};
use crate::transport::{Outbound, TransportError, connect};

/// Error type for session handle calls.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session has shut down")]
    Shutdown,
}

/// Point-in-time view of a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub lifecycle: Lifecycle,
    pub site_id: SiteId,
    pub baseline: String,
    pub baseline_version: u64,
    /// `None` until the site identity arrives.
    pub display_text: Option<String>,
    pub stats: SyncStats,
}

enum SessionCommand {
    SurfaceChanged,
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

/// Cheap, cloneable handle to a session task.
///
/// The task exits on [`shutdown`](Self::shutdown) or once every handle is
/// dropped.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Report a surface change from outside the surface's own notifier.
    pub fn notify_changed(&self) -> Result<(), SessionError> {
        self.tx
            .send(SessionCommand::SurfaceChanged)
            .map_err(|_| SessionError::Shutdown)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Snapshot { reply })
            .map_err(|_| SessionError::Shutdown)?;
        rx.await.map_err(|_| SessionError::Shutdown)
    }

    /// Flush any pending local edit and stop the session.
    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.tx
            .send(SessionCommand::Shutdown)
            .map_err(|_| SessionError::Shutdown)
    }

    /// A notifier that feeds this session without keeping it alive.
    pub fn notifier(&self) -> ChangeNotifier {
        let weak = self.tx.downgrade();
        ChangeNotifier::new(move || {
            if let Some(tx) = weak.upgrade() {
                let _ = tx.send(SessionCommand::SurfaceChanged);
            }
        })
    }
}

/// Spawn a session task for `surface`, talking to the relay through
/// `outbound` and `inbound`.
pub fn spawn_session<S, O>(
    config: &ClientConfig,
    surface: S,
    outbound: O,
    inbound: mpsc::UnboundedReceiver<ServerMessage>,
) -> (SessionHandle, JoinHandle<()>)
where
    S: EditingSurface + Send + 'static,
    O: Outbound + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = SessionHandle { tx };
    let controller = SyncController::new(config, surface, outbound, handle.notifier());
    let task = tokio::spawn(run(controller, rx, inbound));
    (handle, task)
}

/// Connect to `config.relay_addr` and spawn a session over the connection.
pub async fn connect_session<S>(
    config: &ClientConfig,
    surface: S,
) -> Result<(SessionHandle, JoinHandle<()>), TransportError>
where
    S: EditingSurface + Send + 'static,
{
    let conn = connect(&config.relay_addr).await?;
    Ok(spawn_session(config, surface, conn.outbound, conn.inbound))
}

async fn run<S, O>(
    mut controller: SyncController<S, O>,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    mut inbound: mpsc::UnboundedReceiver<ServerMessage>,
) where
    S: EditingSurface,
    O: Outbound,
{
    controller.begin();
    let mut relay_open = true;

    loop {
        let deadline = controller.pending_deadline();

        tokio::select! {
            command = commands.recv() => match command {
                Some(SessionCommand::SurfaceChanged) => {
                    controller.on_surface_changed(Instant::now());
                }
                Some(SessionCommand::Snapshot { reply }) => {
                    let _ = reply.send(snapshot(&controller));
                }
                Some(SessionCommand::Shutdown) => {
                    if let Err(e) = controller.flush_pending() {
                        warn!("final flush failed: {}", e);
                    }
                    break;
                }
                None => break,
            },
            message = inbound.recv(), if relay_open => match message {
                Some(ServerMessage::SiteId(site_id)) => {
                    if let Err(e) = controller.on_site_id(site_id) {
                        warn!("rejected site identity {}: {}", site_id, e);
                    }
                }
                Some(ServerMessage::TextOperations(raw)) => {
                    if let Err(e) = controller.on_remote_batch(&raw) {
                        warn!("remote batch failed: {}", e);
                    }
                }
                None => {
                    info!("relay connection closed");
                    relay_open = false;
                }
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                match controller.on_timer_fired(Instant::now()) {
                    Ok(outcome) => trace!("sync pass: {:?}", outcome),
                    Err(e) => warn!("sync pass failed: {}", e),
                }
            }
        }
    }

    debug!("session for site {} stopped", controller.site_id());
}

fn snapshot<S, O>(controller: &SyncController<S, O>) -> SessionSnapshot
where
    S: EditingSurface,
    O: Outbound,
{
    SessionSnapshot {
        lifecycle: controller.lifecycle(),
        site_id: controller.site_id(),
        baseline: controller.baseline().text().to_string(),
        baseline_version: controller.baseline().version(),
        display_text: controller.display_text(),
        stats: controller.stats(),
    }
}
