//! Incremental query scheduling: immediate vs debounced evaluation.
//!
//! The scheduler is a plain state machine driven by explicit `Instant`s so it
//! can be tested without timers. It owns every timing decision; the switcher
//! only sleeps until the deadline it is handed and reports back with the ticket.
//!
//! ```text
//!   Idle ──submit──▶ Pending(query, deadline) ──fire──▶ Evaluating(query) ──complete──▶ Idle
//!                        ▲          │                         │
//!                        └─submit───┘ (cancels, restarts)      └─submit─▶ Pending (cancels)
//! ```
//!
//! A caller that gives up on its query (future dropped, timer cancelled) calls
//! `abandon`, which returns a current `Pending` or `Evaluating` state to `Idle`.

use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Identifies one submitted query. Only the latest ticket is ever current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Pending { query: String, deadline: Instant },
    Evaluating { query: String },
}

/// What the caller should do with a submitted query
#[derive(Debug, Clone)]
pub enum Admission {
    /// Evaluate now
    Immediate { ticket: Ticket, cancel: CancellationToken },
    /// Sleep until `deadline` (or until `cancel` fires), then call `fire`
    Deferred { ticket: Ticket, deadline: Instant, cancel: CancellationToken },
}

impl Admission {
    pub fn ticket(&self) -> Ticket {
        match self {
            Admission::Immediate { ticket, .. } | Admission::Deferred { ticket, .. } => *ticket,
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        match self {
            Admission::Immediate { cancel, .. } | Admission::Deferred { cancel, .. } => cancel,
        }
    }
}

#[derive(Debug)]
pub struct QueryScheduler {
    delay: Duration,
    leading_edge: bool,
    state: SchedulerState,
    generation: u64,
    cancel: CancellationToken,
    /// When the last query arrived, for leading-edge idle detection
    last_input: Option<Instant>,
}

impl QueryScheduler {
    pub fn new(delay: Duration, leading_edge: bool) -> Self {
        Self {
            delay,
            leading_edge,
            state: SchedulerState::Idle,
            generation: 0,
            cancel: CancellationToken::new(),
            last_input: None,
        }
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    /// Admit a query that must be debounced unless the delay is zero or the
    /// leading edge applies. Any earlier pending or running query is cancelled.
    pub fn submit(&mut self, query: &str, now: Instant) -> Admission {
        let idle_long_enough = self.leading_edge
            && matches!(self.state, SchedulerState::Idle)
            && self.last_input.map_or(true, |t| now.saturating_duration_since(t) >= self.delay);
        self.last_input = Some(now);

        if self.delay.is_zero() || idle_long_enough {
            return self.admit_now(query);
        }

        let (ticket, cancel) = self.next_generation();
        let deadline = now + self.delay;
        self.state = SchedulerState::Pending { query: query.to_string(), deadline };
        Admission::Deferred { ticket, deadline, cancel }
    }

    /// Admit a query that always evaluates immediately (empty, or the mode's default input)
    pub fn submit_immediate(&mut self, query: &str, now: Instant) -> Admission {
        self.last_input = Some(now);
        self.admit_now(query)
    }

    /// Timer fired for `ticket`. Returns false when a newer query superseded it.
    pub fn fire(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        match std::mem::replace(&mut self.state, SchedulerState::Idle) {
            SchedulerState::Pending { query, .. } => {
                self.state = SchedulerState::Evaluating { query };
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Evaluation for `ticket` finished. Returns whether its result may be delivered.
    /// A stale ticket leaves the state of the newer query untouched.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.state = SchedulerState::Idle;
        true
    }

    /// The caller for `ticket` gave up without completing. A current ticket
    /// returns the scheduler to `Idle` and cancels its token; a stale one is ignored.
    pub fn abandon(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.cancel.cancel();
        self.state = SchedulerState::Idle;
        true
    }

    fn admit_now(&mut self, query: &str) -> Admission {
        let (ticket, cancel) = self.next_generation();
        self.state = SchedulerState::Evaluating { query: query.to_string() };
        Admission::Immediate { ticket, cancel }
    }

    fn next_generation(&mut self) -> (Ticket, CancellationToken) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.generation += 1;
        (Ticket(self.generation), self.cancel.clone())
    }
}
