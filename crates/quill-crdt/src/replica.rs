//! The replica seam.

use quill_types::{Char, CharId, Operation, SiteId};

use crate::{IdentityFactory, Result};

/// An ordered character sequence that converges under concurrent edits.
///
/// Positions passed to the `generate_*` methods are indexes into the visible
/// text at the moment of the call. Generating an operation also applies it
/// locally, so a run of calls sees the effect of the previous ones.
pub trait Replica {
    /// Construct an empty replica that mints identities from `ids`.
    fn bound_to(ids: IdentityFactory) -> Self
    where
        Self: Sized;

    fn site_id(&self) -> SiteId;

    /// Insert `value` so it becomes the visible character at `index`.
    fn generate_insert_operation(&mut self, value: char, index: usize) -> Result<Operation>;

    /// Delete the visible character at `index`, which must be `value`.
    fn generate_delete_operation(&mut self, value: char, index: usize) -> Result<Operation>;

    /// Integrate a remote insert. Returns `false` if it was already present.
    fn integrate_insertion(&mut self, ch: &Char) -> Result<bool>;

    /// Integrate a remote delete. Returns `false` if there was nothing to
    /// delete (unknown identity or already a tombstone).
    fn integrate_deletion(&mut self, ch: &Char) -> Result<bool>;

    /// Whether a character with this identity was ever inserted here.
    fn contains(&self, id: CharId) -> bool;

    /// The visible text.
    fn display_text(&self) -> String;
}
