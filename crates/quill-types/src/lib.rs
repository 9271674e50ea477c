//! Shared types for quill: the vocabulary every other crate speaks.
//!
//! - [`SiteId`] / [`CharId`]: who inserted a character, and which one it was
//! - [`Operation`]: the unit that travels between sites
//! - [`ServerMessage`] / [`ClientMessage`]: named-event envelopes on the wire
//!
//! Nothing in here knows about replicas, surfaces, or sockets.

mod error;
pub mod ids;
mod ops;
pub mod wire;

pub use error::WireError;
pub use ids::{CharId, SiteId};
pub use ops::{Batch, Char, Operation, OperationKind, decode_batch, encode_batch};
pub use wire::{ClientMessage, ServerMessage};
