//! The synchronization controller.
//!
//! One controller owns everything a site needs to take part in a session:
//! its identity, the replica, the baseline, the pending debounce deadline and
//! the outbound dispatcher. It never blocks and never spawns; every input is a
//! method call that runs to completion:
//!
//! | input                         | handler                                   |
//! |-------------------------------|-------------------------------------------|
//! | session start                 | [`begin`](SyncController::begin)           |
//! | `site_id` from the relay      | [`on_site_id`](SyncController::on_site_id) |
//! | surface change notification   | [`on_surface_changed`](SyncController::on_surface_changed) |
//! | debounce deadline reached     | [`on_timer_fired`](SyncController::on_timer_fired) |
//! | `text_operations` from relay  | [`on_remote_batch`](SyncController::on_remote_batch) |
//!
//! # Baseline ownership
//!
//! The local pass (read surface, diff, translate, write baseline, dispatch)
//! and the remote pass (integrate, write baseline and surface) both write the
//! baseline. Because each handler runs to completion they cannot interleave,
//! and a remote batch first flushes any local edit the surface is still
//! holding, so integration never overwrites typing that has not been sent.

use quill_crdt::{CrdtError, IdentityFactory, Replica, Sequence, diff};
use quill_types::{Batch, Operation, SiteId, WireError, decode_batch};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use crate::config::ClientConfig;
use crate::debounce::Debouncer;
use crate::dispatch::Dispatcher;
use crate::integrate::{IntegrationReport, integrate_batch};
use crate::lifecycle::{Baseline, Lifecycle};
use crate::surface::{ChangeNotifier, EditingSurface};
use crate::translate::Translator;
use crate::transport::Outbound;

/// Outcome of a local sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No sync was due.
    Idle,
    /// No site identity yet; nothing was diffed.
    NotReady,
    /// Surface already matched the baseline.
    NoChange,
    /// A batch of `ops` operations went out.
    Dispatched { ops: usize },
    /// A batch was built and applied locally but the transport refused it.
    Undelivered { ops: usize },
}

/// Error from a controller handler.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Remote operations arrived before a site identity.
    #[error("site identity not assigned")]
    NotReady,
    /// An inbound batch failed to decode. Nothing from it was applied.
    #[error("malformed remote batch: {0}")]
    MalformedPayload(#[from] WireError),
    /// The replica rejected an operation.
    #[error("replica error: {0}")]
    Replica(#[from] CrdtError),
}

/// Cumulative counters, for logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Local passes run while ready.
    pub passes: u64,
    /// Passes that found a change and computed a diff.
    pub diffs: u64,
    /// Passes where the surface matched the baseline.
    pub no_ops: u64,
    /// Local batches handed to the transport.
    pub batches_sent: u64,
    /// Operations across all sent batches.
    pub ops_sent: u64,
    /// Batches the transport refused.
    pub undelivered: u64,
    /// Remote batches integrated into the replica.
    pub batches_integrated: u64,
    /// Remote operations that changed the replica.
    pub ops_applied: u64,
    /// Remote operations already present, skipped.
    pub duplicates: u64,
    /// Inbound batches rejected at decode.
    pub malformed: u64,
}

/// Synchronization controller for one site.
///
/// `R` is the replica type, constructed when the site identity arrives.
pub struct SyncController<S, O, R = Sequence> {
    lifecycle: Lifecycle,
    surface: S,
    dispatcher: Dispatcher<O>,
    replica: Option<R>,
    baseline: Baseline,
    debouncer: Debouncer,
    notifier: ChangeNotifier,
    placeholder: String,
    stats: SyncStats,
}

impl<S: EditingSurface, O: Outbound> SyncController<S, O, Sequence> {
    /// Controller backed by the bundled [`Sequence`] replica.
    ///
    /// `notifier` is subscribed to the surface once the site is ready.
    pub fn new(config: &ClientConfig, surface: S, outbound: O, notifier: ChangeNotifier) -> Self {
        Self::with_replica(config, surface, outbound, notifier)
    }
}

impl<S, O, R> SyncController<S, O, R>
where
    S: EditingSurface,
    O: Outbound,
    R: Replica,
{
    /// Controller backed by any [`Replica`].
    pub fn with_replica(
        config: &ClientConfig,
        surface: S,
        outbound: O,
        notifier: ChangeNotifier,
    ) -> Self {
        Self {
            lifecycle: Lifecycle::Uninitialized,
            surface,
            dispatcher: Dispatcher::new(outbound),
            replica: None,
            baseline: Baseline::default(),
            debouncer: Debouncer::new(config.debounce_window()),
            notifier,
            placeholder: config.placeholder.clone(),
            stats: SyncStats::default(),
        }
    }

    /// Show the placeholder and lock the surface until the relay answers.
    pub fn begin(&mut self) {
        if self.lifecycle != Lifecycle::Uninitialized {
            return;
        }
        self.surface.set_value(&self.placeholder);
        self.surface.set_visible(false);
        self.surface.set_editable(false);
        self.lifecycle = Lifecycle::AwaitingSiteId;
        debug!("awaiting site identity");
    }

    /// Accept the relay's site identity and unlock the surface.
    ///
    /// Returns `false` if an identity was already accepted; a repeat is
    /// ignored.
    pub fn on_site_id(&mut self, site_id: SiteId) -> Result<bool, SyncError> {
        if self.lifecycle.is_ready() {
            warn!(
                "ignoring site_id {} (already assigned {})",
                site_id,
                self.dispatcher.site_id()
            );
            return Ok(false);
        }

        let replica = R::bound_to(IdentityFactory::new(site_id)?);
        let text = replica.display_text();

        self.dispatcher.assign(site_id);
        self.baseline.set(text.clone());
        self.surface.set_value(&text);
        self.surface.set_visible(true);
        self.surface.set_editable(true);
        self.surface.subscribe(self.notifier.clone());
        self.replica = Some(replica);
        self.lifecycle = Lifecycle::Ready;

        info!("assigned site {}", site_id);
        Ok(true)
    }

    /// Debounce a change notification. Returns the new deadline.
    pub fn on_surface_changed(&mut self, now: Instant) -> Instant {
        let deadline = self.debouncer.notify(now);
        trace!("sync scheduled for {:?}", deadline);
        deadline
    }

    /// Run the local pass if the debounce deadline has passed.
    pub fn on_timer_fired(&mut self, now: Instant) -> Result<SyncOutcome, SyncError> {
        if !self.debouncer.take_due(now) {
            return Ok(SyncOutcome::Idle);
        }
        self.run_pass()
    }

    /// Decode and integrate a `text_operations` batch from the relay.
    ///
    /// Decoding is all-or-nothing: one bad operation rejects the batch
    /// before the replica sees any of it.
    pub fn on_remote_batch(
        &mut self,
        raw: &[serde_json::Value],
    ) -> Result<IntegrationReport, SyncError> {
        if !self.lifecycle.is_ready() {
            return Err(SyncError::NotReady);
        }

        let batch = decode_batch(raw).inspect_err(|e| {
            self.stats.malformed += 1;
            warn!("rejecting remote batch of {} ops: {}", raw.len(), e);
        })?;

        if let Err(e) = self.flush_pending() {
            error!("failed to flush local edit before remote batch: {}", e);
        }

        let Some(replica) = self.replica.as_mut() else {
            return Err(SyncError::NotReady);
        };
        let report = integrate_batch(replica, &mut self.surface, &mut self.baseline, &batch)?;

        self.stats.batches_integrated += 1;
        self.stats.ops_applied += report.applied as u64;
        self.stats.duplicates += report.duplicates as u64;
        debug!(
            "integrated remote batch: {} applied, {} duplicate",
            report.applied, report.duplicates
        );
        Ok(report)
    }

    /// Sync any local edit now, without waiting for the debounce deadline.
    pub fn flush_pending(&mut self) -> Result<SyncOutcome, SyncError> {
        self.debouncer.cancel();
        self.run_pass()
    }

    /// Send a batch as one `text_operations` message.
    ///
    /// `false` until the site identity is assigned, and when the transport
    /// refuses the message.
    pub fn send_batch(&mut self, batch: &[Operation]) -> bool {
        self.dispatcher.send(batch)
    }

    pub fn pending_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// The replica's visible text, or `None` before the site is ready.
    pub fn display_text(&self) -> Option<String> {
        self.replica.as_ref().map(|r| r.display_text())
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn site_id(&self) -> SiteId {
        self.dispatcher.site_id()
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn run_pass(&mut self) -> Result<SyncOutcome, SyncError> {
        let Some(replica) = self.replica.as_mut() else {
            return Ok(SyncOutcome::NotReady);
        };
        self.stats.passes += 1;

        let current = self.surface.value();
        if self.baseline.matches(&current) {
            self.stats.no_ops += 1;
            trace!("surface matches baseline, nothing to sync");
            return Ok(SyncOutcome::NoChange);
        }

        let segments = diff(self.baseline.text(), &current);
        self.stats.diffs += 1;

        let mut translator = Translator::new();
        let mut batch = Batch::new();
        let translated = segments
            .iter()
            .try_for_each(|segment| translator.apply_segment(segment, replica, &mut batch));
        if let Err(e) = translated {
            // Everything in `batch` is already in the replica, so peers get it too.
            self.baseline.set(replica.display_text());
            error!("translation failed with {} ops generated: {}", batch.len(), e);
            if !batch.is_empty() {
                self.dispatch(&batch);
            }
            return Err(e.into());
        }
        self.baseline.set(current);

        Ok(self.dispatch(&batch))
    }

    fn dispatch(&mut self, batch: &Batch) -> SyncOutcome {
        let ops = batch.len();
        if self.dispatcher.send(batch) {
            self.stats.batches_sent += 1;
            self.stats.ops_sent += ops as u64;
            debug!("dispatched batch of {} ops", ops);
            SyncOutcome::Dispatched { ops }
        } else {
            self.stats.undelivered += 1;
            SyncOutcome::Undelivered { ops }
        }
    }
}
