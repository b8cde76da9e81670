//! Cancellable one-shot timers on the Tokio runtime.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// Identifies one armed timer. Ids are never reused within a [`TimerSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimerTicket {
    id: u64,
}

/// The timers currently armed by one controller.
///
/// A fired timer must call [`TimerSet::complete`] under the same lock that
/// guards [`TimerSet::cancel_all`]; `complete` returns false for a timer that
/// was cancelled, even if its task already woke up and was waiting on the
/// lock when the cancellation happened.
#[derive(Debug)]
pub(crate) struct TimerSet {
    /// `None` when created outside a Tokio runtime; nothing is ever armed.
    runtime: Option<Handle>,
    next_id: u64,
    active: Vec<(u64, AbortHandle)>,
}

impl TimerSet {
    pub(crate) fn new(runtime: Option<Handle>) -> Self {
        Self {
            runtime,
            next_id: 0,
            active: Vec::new(),
        }
    }

    /// Runs `fire` once `delay` has elapsed, unless cancelled first. Returns
    /// `None` without a runtime to spawn on.
    pub(crate) fn schedule<F>(&mut self, delay: Duration, fire: F) -> Option<TimerTicket>
    where
        F: FnOnce(TimerTicket) + Send + 'static,
    {
        let runtime = self.runtime.as_ref()?;
        let ticket = TimerTicket { id: self.next_id };
        self.next_id += 1;

        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            fire(ticket);
        });
        self.active.push((ticket.id, task.abort_handle()));
        Some(ticket)
    }

    /// Retires a fired timer. Returns false if it had been cancelled.
    pub(crate) fn complete(&mut self, ticket: TimerTicket) -> bool {
        match self.active.iter().position(|(id, _)| *id == ticket.id) {
            Some(index) => {
                self.active.remove(index);
                true
            }
            None => false,
        }
    }

    /// Aborts every armed timer. Returns how many were cancelled.
    pub(crate) fn cancel_all(&mut self) -> usize {
        let cancelled = self.active.len();
        for (_, task) in self.active.drain(..) {
            task.abort();
        }
        cancelled
    }

    pub(crate) fn len(&self) -> usize {
        self.active.len()
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
