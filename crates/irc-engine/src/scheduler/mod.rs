//! Cancellable timer scheduling
//!
//! Each engine owns one [`Scheduler`]. Work is stamped with a [`Ticket`]
//! taken under the engine's state lock; [`Scheduler::cancel_all`] bumps the
//! generation and aborts spawned tasks, so every ticket issued before it is
//! stale. Continuations re-check their ticket under the same lock before
//! mutating anything.

use crate::error::EngineError;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Generation stamp for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Generation this ticket was issued in
    #[inline]
    #[must_use]
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Per-engine timer owner
#[derive(Debug)]
pub struct Scheduler {
    generation: AtomicU64,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    time_scale: f64,
}

impl Scheduler {
    /// Create with a delay multiplier
    #[must_use]
    pub fn new(time_scale: f64) -> Self {
        Self {
            generation: AtomicU64::new(0),
            tasks: Mutex::new(Vec::new()),
            time_scale,
        }
    }

    /// Ticket for the current generation
    #[inline]
    #[must_use]
    pub fn ticket(&self) -> Ticket {
        Ticket(self.generation.load(Ordering::Acquire))
    }

    /// Whether `ticket` was issued after the last cancellation
    #[inline]
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::Acquire) == ticket.0
    }

    /// Current generation
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Simulated duration after scaling
    #[must_use]
    pub fn scaled(&self, duration: Duration) -> Duration {
        duration.mul_f64(self.time_scale)
    }

    /// Sleep for a scaled duration
    ///
    /// # Errors
    /// `EngineError::Cancelled` if the ticket went stale while sleeping.
    pub async fn delay(&self, ticket: Ticket, duration: Duration) -> Result<(), EngineError> {
        tokio::time::sleep(self.scaled(duration)).await;
        if self.is_current(ticket) {
            Ok(())
        } else {
            tracing::trace!(generation = ticket.0, "stale timer dropped");
            Err(EngineError::Cancelled)
        }
    }

    /// Spawn a timer task owned by this scheduler
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        let mut tasks = self.tasks.lock();
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle);
    }

    /// Invalidate every outstanding ticket and abort spawned tasks
    ///
    /// Returns the new generation.
    pub fn cancel_all(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let aborted: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in &aborted {
            task.abort();
        }
        tracing::trace!(generation, aborted = aborted.len(), "scheduler cancelled");
        generation
    }

    /// Spawned tasks still running
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.tasks.lock().iter().filter(|t| !t.is_finished()).count()
    }
}

/// Rolls back an in-flight run whose future is dropped before it finishes
///
/// Runs execute inside the caller's future, so a `timeout` or `select!` can
/// drop them between timers. On drop the guard applies `abandon` under the
/// state lock, unless it was disarmed or a reset already made the ticket
/// stale.
#[derive(Debug)]
pub(crate) struct RunGuard<'a, S> {
    state: &'a Mutex<S>,
    scheduler: &'a Scheduler,
    ticket: Ticket,
    abandon: fn(&mut S),
    armed: bool,
}

impl<'a, S> RunGuard<'a, S> {
    pub(crate) fn new(
        state: &'a Mutex<S>,
        scheduler: &'a Scheduler,
        ticket: Ticket,
        abandon: fn(&mut S),
    ) -> Self {
        Self {
            state,
            scheduler,
            ticket,
            abandon,
            armed: true,
        }
    }

    pub(crate) fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// The run finished; leave its state alone
    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl<S> Drop for RunGuard<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock();
        if self.scheduler.is_current(self.ticket) {
            (self.abandon)(&mut state);
            tracing::debug!(generation = self.ticket.0, "run dropped before completion");
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}
