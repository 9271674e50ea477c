//! Error types for replica operations.

use quill_types::CharId;
use thiserror::Error;

/// Errors that can occur while generating or integrating operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CrdtError {
    /// Edit position out of bounds.
    #[error("position {pos} out of bounds for text with length {len}")]
    PositionOutOfBounds { pos: usize, len: usize },

    /// The character at a delete position is not the one the caller expected.
    #[error("expected {expected:?} at position {pos}, found {found:?}")]
    CharacterMismatch {
        pos: usize,
        expected: char,
        found: char,
    },

    /// A remote insert references an anchor this replica has never seen.
    #[error("insert {id} anchored on unknown character {anchor}")]
    UnknownAnchor { id: CharId, anchor: CharId },

    /// The identity factory was asked for ids before the site was assigned.
    #[error("site identity not assigned")]
    Unassigned,
}
