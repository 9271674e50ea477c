//! Remote operation integration.

use quill_crdt::{Replica, Result};
use quill_types::Operation;
use tracing::trace;

use crate::lifecycle::Baseline;
use crate::surface::EditingSurface;

/// What one remote batch did to the replica.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntegrationReport {
    /// Operations that changed the replica.
    pub applied: usize,
    /// Inserts already present, and deletes with nothing left to delete.
    pub duplicates: usize,
}

/// Apply `batch` to `replica` strictly in order.
///
/// After every operation that changed the replica, its display text is
/// written to the baseline and then to the surface, so the change notification
/// the surface fires for that write diffs to nothing.
///
/// An error stops the batch. Operations already applied stay applied, and the
/// baseline still matches the replica.
pub fn integrate_batch<R, S>(
    replica: &mut R,
    surface: &mut S,
    baseline: &mut Baseline,
    batch: &[Operation],
) -> Result<IntegrationReport>
where
    R: Replica,
    S: EditingSurface,
{
    let mut report = IntegrationReport::default();

    for op in batch {
        let changed = match op {
            Operation::Insert(ch) => {
                if replica.contains(ch.identity) {
                    trace!("skipping duplicate insert {}", ch.identity);
                    false
                } else {
                    replica.integrate_insertion(ch)?
                }
            }
            Operation::Delete(ch) => replica.integrate_deletion(ch)?,
        };

        if !changed {
            report.duplicates += 1;
            continue;
        }

        report.applied += 1;
        let text = replica.display_text();
        baseline.set(text.clone());
        surface.set_value(&text);
    }

    Ok(report)
}
