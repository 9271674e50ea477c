//! Debounce timer for surface change notifications.

use std::time::Duration;

use tokio::time::Instant;

/// A single cancellable scheduled sync.
///
/// Every [`notify`](Debouncer::notify) cancels whatever was scheduled and
/// schedules a fresh deadline one window out, so there is never more than one
/// outstanding sync and a burst of notifications collapses into one pass.
/// The owner polls [`take_due`](Debouncer::take_due) when the deadline passes.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Cancel-then-reschedule. Returns the new deadline.
    pub fn notify(&mut self, now: Instant) -> Instant {
        self.cancel();
        let deadline = now + self.window;
        self.deadline = Some(deadline);
        deadline
    }

    /// Drop the scheduled sync, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the scheduled sync if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
