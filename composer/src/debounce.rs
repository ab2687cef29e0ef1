//! A single-slot trailing debouncer.
//!
//! Each instance holds at most one pending call; scheduling again replaces
//! the payload and pushes the deadline out (last-write-wins, no backlog).
//! Like the rest of the composer's timing machinery it never owns a timer:
//! callers pass `Instant` in and poll on their UI tick.

use std::time::Duration;
use std::time::Instant;

#[derive(Debug)]
pub struct Debouncer<T> {
    wait: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    payload: T,
    deadline: Instant,
}

impl<T> Debouncer<T> {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Schedule a call with `payload`. A pending call is replaced and its
    /// deadline rescheduled to `now + wait`.
    pub fn schedule(&mut self, payload: T, now: Instant) {
        self.pending = Some(Pending {
            payload,
            deadline: now + self.wait,
        });
    }

    /// Fire the pending call if its deadline has been reached. At most one
    /// invocation results from any number of schedules.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| now >= pending.deadline)
        {
            return self.pending.take().map(|pending| pending.payload);
        }
        None
    }

    /// Drop the pending call, if any. Safe to call when idle.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Invoke the pending call immediately with its latest captured payload
    /// and clear the slot, so the originally scheduled deadline cannot fire
    /// a duplicate afterwards.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }
}
