//! The relay hub: site identities, ordered fan-out, catch-up log.
//!
//! The relay never decodes operations. It assigns each connection a site
//! identity, then forwards every batch it receives to every *other* site, in
//! the order it received them. All of that happens under one lock, so every
//! site observes the same global order of batches, and a joining site gets
//! its `site_id`, then the catch-up log, then live traffic, with no gap or
//! overlap between the last two.
//!
//! The catch-up log is complete or absent. Replaying only a suffix would hand
//! a joiner inserts anchored on characters it never saw, so when the log
//! outgrows `history_limit` the relay drops it and refuses every later join
//! instead. Sites already connected are unaffected.

use std::collections::{BTreeMap, VecDeque};

use parking_lot::Mutex;
use quill_types::{ServerMessage, SiteId};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace};

use crate::error::{RelayError, Result};

/// A site's end of the relay: its identity and everything addressed to it.
#[derive(Debug)]
pub struct Peer {
    pub site_id: SiteId,
    pub outbox: mpsc::UnboundedReceiver<ServerMessage>,
}

#[derive(Debug)]
struct RelayState {
    next_site: u32,
    peers: BTreeMap<SiteId, mpsc::UnboundedSender<ServerMessage>>,
    history: VecDeque<Vec<Value>>,
    /// Set once the log outgrew its limit and was discarded.
    history_lost: bool,
}

#[derive(Debug)]
pub struct Relay {
    state: Mutex<RelayState>,
    history_limit: usize,
}

impl Relay {
    pub fn new(history_limit: usize) -> Self {
        Self {
            state: Mutex::new(RelayState {
                next_site: SiteId::UNASSIGNED.get() + 1,
                peers: BTreeMap::new(),
                history: VecDeque::new(),
                history_lost: false,
            }),
            history_limit,
        }
    }

    /// Register a new site.
    ///
    /// The returned outbox already holds the `site_id` message followed by
    /// the catch-up log. Fails with [`RelayError::HistoryFull`] once the log
    /// has been discarded, since the site could not reconstruct the document.
    pub fn join(&self) -> Result<Peer> {
        let mut state = self.state.lock();

        if state.history_lost {
            error!(
                "refusing new site: catch-up log exceeded {} batches",
                self.history_limit
            );
            return Err(RelayError::HistoryFull {
                limit: self.history_limit,
            });
        }

        let site_id = SiteId::new(state.next_site);
        state.next_site = state
            .next_site
            .checked_add(1)
            .ok_or(RelayError::SiteIdsExhausted)?;

        let (tx, outbox) = mpsc::unbounded_channel();
        // The receiver is alive in this scope, so these sends cannot fail.
        let _ = tx.send(ServerMessage::SiteId(site_id));
        for batch in &state.history {
            let _ = tx.send(ServerMessage::TextOperations(batch.clone()));
        }
        state.peers.insert(site_id, tx);

        info!(
            "site {} joined ({} replayed, {} connected)",
            site_id,
            state.history.len(),
            state.peers.len()
        );
        Ok(Peer { site_id, outbox })
    }

    /// Forget a site. Returns whether it was connected.
    pub fn leave(&self, site_id: SiteId) -> bool {
        let mut state = self.state.lock();
        let removed = state.peers.remove(&site_id).is_some();
        if removed {
            info!("site {} left ({} connected)", site_id, state.peers.len());
        }
        removed
    }

    /// Forward a batch from `from` to every other site and record it for
    /// late joiners. Returns the number of sites it was delivered to.
    pub fn broadcast(&self, from: SiteId, batch: Vec<Value>) -> usize {
        let mut state = self.state.lock();
        let ops = batch.len();

        let mut delivered = 0;
        let mut gone = Vec::new();
        for (&site_id, tx) in &state.peers {
            if site_id == from {
                continue;
            }
            if tx.send(ServerMessage::TextOperations(batch.clone())).is_ok() {
                delivered += 1;
            } else {
                gone.push(site_id);
            }
        }
        for site_id in gone {
            debug!("dropping closed outbox for site {}", site_id);
            state.peers.remove(&site_id);
        }

        if !state.history_lost {
            if self.history_limit > 0 && state.history.len() >= self.history_limit {
                error!(
                    "catch-up log exceeded {} batches; dropping it, new sites will be refused",
                    self.history_limit
                );
                state.history = VecDeque::new();
                state.history_lost = true;
            } else {
                state.history.push_back(batch);
            }
        }

        trace!("site {} batch of {} ops delivered to {} sites", from, ops, delivered);
        delivered
    }

    pub fn peer_count(&self) -> usize {
        self.state.lock().peers.len()
    }

    pub fn history_len(&self) -> usize {
        self.state.lock().history.len()
    }
}
