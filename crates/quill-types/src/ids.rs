//! Typed identifiers for sites and characters.
//!
//! A [`SiteId`] is handed out by the relay, one per connected editor. Zero is
//! reserved as the "not yet assigned" sentinel, so a site that has not heard
//! back from the relay can never mint a valid [`CharId`].
//!
//! A [`CharId`] names one inserted character forever: `(site, counter)`. The
//! counter is per-site and only ever grows.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A site identifier assigned by the relay.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(u32);

impl SiteId {
    /// Sentinel for a site that has not received its identity yet.
    pub const UNASSIGNED: SiteId = SiteId(0);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw integer, as sent on the wire.
    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl Default for SiteId {
    fn default() -> Self {
        Self::UNASSIGNED
    }
}

impl From<u32> for SiteId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_assigned() {
            write!(f, "SiteId({})", self.0)
        } else {
            f.write_str("SiteId(unassigned)")
        }
    }
}

/// Globally unique identity of one inserted character.
///
/// Ordered by counter first and site second, so identities minted later in
/// causal time sort after the ones they could have observed. Ties on the
/// counter are broken deterministically by site.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharId {
    pub site_id: SiteId,
    pub counter: u64,
}

impl CharId {
    pub const fn new(site_id: SiteId, counter: u64) -> Self {
        Self { site_id, counter }
    }
}

impl PartialOrd for CharId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CharId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.counter
            .cmp(&other.counter)
            .then_with(|| self.site_id.cmp(&other.site_id))
    }
}

impl fmt::Display for CharId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.site_id, self.counter)
    }
}

impl fmt::Debug for CharId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CharId({}:{})", self.site_id.0, self.counter)
    }
}
