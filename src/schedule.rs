//! Latest-wins settling for callers that re-run a simulation on every input
//! change.
//!
//! The gate holds at most one pending request. Each `schedule` replaces the
//! pending request and restarts the settle window, so a burst of edits
//! produces a single invocation once the input has been quiet for the
//! configured duration. Time is passed in explicitly by the caller's event
//! loop.

use std::time::{Duration, Instant};

pub const DEFAULT_SETTLE_MS: u64 = 300;

/// Identifies one scheduled request; later tickets supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug)]
struct Pending<T> {
    ticket: Ticket,
    scheduled_at: Instant,
    request: T,
}

#[derive(Debug)]
pub struct SettleGate<T> {
    settle: Duration,
    next_ticket: u64,
    latest: Option<Ticket>,
    pending: Option<Pending<T>>,
}

impl<T> SettleGate<T> {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            next_ticket: 0,
            latest: None,
            pending: None,
        }
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }

    pub fn schedule(&mut self, now: Instant, request: T) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        if let Some(superseded) = self.pending.replace(Pending {
            ticket,
            scheduled_at: now,
            request,
        }) {
            tracing::trace!(
                superseded = superseded.ticket.0,
                ticket = ticket.0,
                "request superseded"
            );
        }
        self.latest = Some(ticket);
        ticket
    }

    /// Release the pending request once the settle window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<(Ticket, T)> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.scheduled_at) >= self.settle);
        if !ready {
            return None;
        }
        self.pending.take().map(|p| (p.ticket, p.request))
    }

    /// Time left before the pending request is released.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending.as_ref().map(|p| {
            self.settle
                .saturating_sub(now.saturating_duration_since(p.scheduled_at))
        })
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether a result computed for `ticket` is still the newest one.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest == Some(ticket)
    }
}
