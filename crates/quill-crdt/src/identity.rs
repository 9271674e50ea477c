//! Character identity factory.

use quill_types::{CharId, SiteId};
use tracing::trace;

use crate::{CrdtError, Result};

/// Mints [`CharId`]s for one site.
///
/// The counter strictly increases with every id handed out and never goes
/// back. It also moves past any counter observed from a remote site, so an
/// id minted here always orders after everything this site has already seen.
#[derive(Debug, Clone)]
pub struct IdentityFactory {
    site_id: SiteId,
    counter: u64,
}

impl IdentityFactory {
    /// Bind a factory to an assigned site.
    pub fn new(site_id: SiteId) -> Result<Self> {
        if !site_id.is_assigned() {
            return Err(CrdtError::Unassigned);
        }
        Ok(Self {
            site_id,
            counter: 0,
        })
    }

    pub fn site_id(&self) -> SiteId {
        self.site_id
    }

    /// The last counter value handed out or observed.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Next identity for a locally inserted character.
    pub fn next(&mut self) -> CharId {
        self.counter += 1;
        CharId::new(self.site_id, self.counter)
    }

    /// Record a remote identity so later local ids sort after it.
    pub fn observe(&mut self, id: CharId) {
        if id.counter > self.counter {
            trace!(
                "site {} counter {} -> {} (observed {})",
                self.site_id, self.counter, id.counter, id
            );
            self.counter = id.counter;
        }
    }
}
