//! Outbound dispatch, gated on site identity.

use quill_types::{ClientMessage, Operation, SiteId, encode_batch};
use tracing::{debug, warn};

use crate::transport::Outbound;

/// Sends batches to the relay, but only once the site has an identity.
///
/// `send` reports failure as a plain `false`: not being ready yet is an
/// expected state, not an error, and the caller may try again later. Sends are
/// never retried here; delivery is the transport's business.
#[derive(Debug)]
pub struct Dispatcher<O> {
    outbound: O,
    site_id: SiteId,
}

impl<O: Outbound> Dispatcher<O> {
    pub fn new(outbound: O) -> Self {
        Self {
            outbound,
            site_id: SiteId::UNASSIGNED,
        }
    }

    /// Unlock sending. The identity is fixed once set.
    pub fn assign(&mut self, site_id: SiteId) {
        if !self.site_id.is_assigned() {
            self.site_id = site_id;
        }
    }

    pub fn site_id(&self) -> SiteId {
        self.site_id
    }

    pub fn is_ready(&self) -> bool {
        self.site_id.is_assigned()
    }

    /// Emit one `text_operations` message carrying the whole batch in order.
    pub fn send(&mut self, batch: &[Operation]) -> bool {
        if !self.is_ready() {
            debug!("dropping batch of {} ops: site identity not assigned", batch.len());
            return false;
        }
        let payload = match encode_batch(batch) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("failed to encode batch: {}", e);
                return false;
            }
        };
        match self.outbound.emit(ClientMessage::TextOperations(payload)) {
            Ok(()) => true,
            Err(e) => {
                warn!("site {} failed to send batch of {} ops: {}", self.site_id, batch.len(), e);
                false
            }
        }
    }

    pub fn outbound(&self) -> &O {
        &self.outbound
    }
}
