//! # Request Tickets
//!
//! Every request the client fires is stamped with a ticket: the operation
//! kind plus a monotonic sequence number for that kind. When a response comes
//! back, only the ticket most recently issued for its kind may be applied.
//! Anything older was superseded while it was in flight and is dropped.
//!
//! ```text
//! issue(Switch) → #1 ──────────────┐
//! issue(Switch) → #2 ───┐          │
//!                       ▼          ▼
//!                 applied     discarded (stale)
//! ```
//!
//! Several kinds (create, switch, delete, list) can also move the active
//! conversation. Tickets carry a global issue `order` for that slot: a reply
//! may only move the active id when no request issued after it already has.

use std::collections::HashMap;

/// Logical request slots. Each slot has its own sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Send,
    Create,
    Clear,
    Switch,
    Delete,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub kind: OpKind,
    pub seq: u64,
    /// Position among all issued tickets, regardless of kind.
    pub order: u64,
}

#[derive(Debug, Default)]
pub struct RequestLedger {
    latest: HashMap<OpKind, u64>,
    issued: u64,
    /// Order of the newest ticket that moved the active conversation.
    active_claimed: u64,
    in_flight: usize,
}

impl RequestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp a new request of `kind`. Supersedes any earlier ticket of that kind.
    pub fn issue(&mut self, kind: OpKind) -> Ticket {
        let seq = self.latest.entry(kind).or_insert(0);
        *seq += 1;
        self.issued += 1;
        self.in_flight += 1;
        Ticket {
            kind,
            seq: *seq,
            order: self.issued,
        }
    }

    /// Record that a request finished (success, failure, or timeout).
    /// Returns true when its response is still the latest for its kind.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.is_current(ticket)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.get(&ticket.kind).copied() == Some(ticket.seq)
    }

    /// True unless a request issued after `ticket` already moved the active conversation.
    pub fn may_activate(&self, ticket: Ticket) -> bool {
        ticket.order >= self.active_claimed
    }

    /// Record that `ticket`'s reply moved the active conversation.
    pub fn claim_active(&mut self, ticket: Ticket) {
        self.active_claimed = self.active_claimed.max(ticket.order);
    }

    /// Number of requests issued but not yet settled.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}
