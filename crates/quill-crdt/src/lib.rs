//! Character-sequence CRDT and text diff for quill.
//!
//! The sync controller treats both of these as collaborators behind narrow
//! seams:
//!
//! - [`Replica`]: an ordered character sequence that resolves concurrent
//!   inserts and deletes deterministically. [`Sequence`] is the bundled
//!   implementation (RGA: each character remembers the character it was
//!   inserted after, ties broken by [`CharId`](quill_types::CharId) order).
//! - [`diff`]: aligns two strings into equal/delete/insert segments.
//!
//! # CRDT Semantics
//!
//! - Inserts anchor on the identity of their left neighbour, never on an index
//! - Deletes tombstone by identity; tombstones are kept forever
//! - Applying the same insert or delete twice has no further effect

pub mod diff;
mod error;
mod identity;
mod replica;
mod sequence;

pub use diff::{DiffTag, Segment, diff};
pub use error::CrdtError;
pub use identity::IdentityFactory;
pub use replica::Replica;
pub use sequence::Sequence;

/// Result type for CRDT operations.
pub type Result<T> = std::result::Result<T, CrdtError>;
