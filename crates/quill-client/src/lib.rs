//! Quill synchronization client library
//!
//! Turns edits on a local text surface into character operations for the
//! relay, and folds the relay's operations back into the surface without
//! echoing them. [`SyncController`] is the synchronous core; [`spawn_session`]
//! drives one from a tokio task over a TCP [`connect`]ion.

pub mod config;
pub mod constants;
pub mod debounce;
pub mod dispatch;
pub mod integrate;
pub mod lifecycle;
pub mod session;
pub mod surface;
pub mod sync;
pub mod transport;
pub mod translate;

pub use config::{ClientConfig, ConfigError};
pub use debounce::Debouncer;
pub use dispatch::Dispatcher;
pub use integrate::{IntegrationReport, integrate_batch};
pub use lifecycle::{Baseline, Lifecycle};
pub use session::{SessionError, SessionHandle, SessionSnapshot, connect_session, spawn_session};
pub use surface::{ChangeNotifier, EditingSurface, MemorySurface};
pub use sync::{SyncController, SyncError, SyncOutcome, SyncStats};
pub use transport::{Connection, Outbound, TransportError, connect};
pub use translate::{Translator, translate};
