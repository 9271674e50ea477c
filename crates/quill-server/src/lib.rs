//! Quill relay server library
//!
//! Assigns site identities and fans text operation batches out to every
//! other connected site, over newline-delimited JSON on TCP.

pub mod config;
pub mod constants;
pub mod error;
pub mod relay;
pub mod server;

pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use relay::{Peer, Relay};
pub use server::{bind, serve};
