//! Stale-response guard.
//!
//! Every outgoing request takes a ticket with a monotonically increasing
//! sequence number. When the response arrives, it is applied only if its
//! ticket is still the newest one issued; otherwise a later request has
//! superseded it and the response is dropped.

/// Proof that a request was issued. Not `Clone`: one response per ticket.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Issues tickets and answers whether a ticket is still current.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket { seq: self.latest }
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        ticket.seq == self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}
