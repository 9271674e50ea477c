//! RGA character sequence.
//!
//! Characters live in one vector in document order, tombstones included.
//! An insert lands right after its anchor, then skips over any neighbours
//! whose identity orders after its own: those were inserted concurrently (or
//! later) at the same spot and win the position closer to the anchor. Because
//! [`IdentityFactory`] keeps counters Lamport-style, a character's
//! descendants always order after it, so the skip never splits a subtree.

use std::collections::HashSet;

use quill_types::{Char, CharId, Operation, SiteId};
use tracing::trace;

use crate::{CrdtError, IdentityFactory, Replica, Result};

#[derive(Debug, Clone)]
struct Element {
    ch: Char,
    deleted: bool,
}

/// The bundled [`Replica`] implementation.
#[derive(Debug, Clone)]
pub struct Sequence {
    ids: IdentityFactory,
    elements: Vec<Element>,
    known: HashSet<CharId>,
    visible: usize,
}

impl Sequence {
    /// Number of visible characters.
    pub fn len(&self) -> usize {
        self.visible
    }

    pub fn is_empty(&self) -> bool {
        self.visible == 0
    }

    /// Number of stored characters including tombstones.
    pub fn stored_len(&self) -> usize {
        self.elements.len()
    }

    /// The identity factory's current counter.
    pub fn counter(&self) -> u64 {
        self.ids.counter()
    }

    fn position_of(&self, id: CharId) -> Option<usize> {
        self.elements.iter().position(|e| e.ch.identity == id)
    }

    /// Storage position of the `index`-th visible character.
    fn visible_position(&self, index: usize) -> Option<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.deleted)
            .nth(index)
            .map(|(pos, _)| pos)
    }

    fn place(&mut self, ch: Char) -> Result<()> {
        let mut pos = match ch.anchor {
            None => 0,
            Some(anchor) => match self.position_of(anchor) {
                Some(p) => p + 1,
                None => {
                    return Err(CrdtError::UnknownAnchor {
                        id: ch.identity,
                        anchor,
                    });
                }
            },
        };
        while pos < self.elements.len() && self.elements[pos].ch.identity > ch.identity {
            pos += 1;
        }
        self.ids.observe(ch.identity);
        self.known.insert(ch.identity);
        self.elements.insert(pos, Element { ch, deleted: false });
        self.visible += 1;
        Ok(())
    }
}

impl Replica for Sequence {
    fn bound_to(ids: IdentityFactory) -> Self {
        Self {
            ids,
            elements: Vec::new(),
            known: HashSet::new(),
            visible: 0,
        }
    }

    fn site_id(&self) -> SiteId {
        self.ids.site_id()
    }

    fn generate_insert_operation(&mut self, value: char, index: usize) -> Result<Operation> {
        if index > self.visible {
            return Err(CrdtError::PositionOutOfBounds {
                pos: index,
                len: self.visible,
            });
        }
        let anchor = match index {
            0 => None,
            i => self
                .visible_position(i - 1)
                .map(|pos| self.elements[pos].ch.identity),
        };
        let ch = Char::new(value, self.ids.next(), anchor);
        self.place(ch.clone())?;
        Ok(Operation::Insert(ch))
    }

    fn generate_delete_operation(&mut self, value: char, index: usize) -> Result<Operation> {
        let pos = self
            .visible_position(index)
            .ok_or(CrdtError::PositionOutOfBounds {
                pos: index,
                len: self.visible,
            })?;
        let element = &mut self.elements[pos];
        if element.ch.value != value {
            return Err(CrdtError::CharacterMismatch {
                pos: index,
                expected: value,
                found: element.ch.value,
            });
        }
        element.deleted = true;
        self.visible -= 1;
        Ok(Operation::Delete(element.ch.clone()))
    }

    fn integrate_insertion(&mut self, ch: &Char) -> Result<bool> {
        if self.known.contains(&ch.identity) {
            return Ok(false);
        }
        self.place(ch.clone())?;
        Ok(true)
    }

    fn integrate_deletion(&mut self, ch: &Char) -> Result<bool> {
        let Some(pos) = self.position_of(ch.identity) else {
            trace!("delete for unknown character {}, ignoring", ch.identity);
            return Ok(false);
        };
        let element = &mut self.elements[pos];
        if element.deleted {
            return Ok(false);
        }
        element.deleted = true;
        self.visible -= 1;
        Ok(true)
    }

    fn contains(&self, id: CharId) -> bool {
        self.known.contains(&id)
    }

    fn display_text(&self) -> String {
        self.elements
            .iter()
            .filter(|e| !e.deleted)
            .map(|e| e.ch.value)
            .collect()
    }
}
