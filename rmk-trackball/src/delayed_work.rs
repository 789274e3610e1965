//! Cancelable, reschedulable deadlines which run on the controller's own task.
//!
//! A [`DelayedWork`] only records when its work is due. The owner awaits [`DelayedWork::wait`]
//! next to its other event sources and runs the work itself once the deadline passes, so the
//! work never runs concurrently with the owner's event handlers.

use core::future::pending;

use embassy_time::{Duration, Instant, Timer};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DelayedWork {
    deadline: Option<Instant>,
}

impl DelayedWork {
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Schedule the work `delay` after `now`.
    ///
    /// An already pending deadline is kept. Returns `true` if the work was newly scheduled.
    pub fn schedule(&mut self, now: Instant, delay: Duration) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(now + delay);
        true
    }

    /// Schedule the work `delay` after `now`, replacing any pending deadline
    pub fn reschedule(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    /// Cancel the pending work. Returns `true` if there was pending work.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Clear the deadline if it has passed at `now`, returning whether the work is due
    pub fn take_expired(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Wait until the deadline, never resolves if no work is pending
    pub async fn wait(&self) {
        match self.deadline {
            Some(deadline) => Timer::at(deadline).await,
            None => pending::<()>().await,
        }
    }
}
