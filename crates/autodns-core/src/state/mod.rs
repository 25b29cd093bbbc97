// # Agent State
//
// In-memory state of one reporting loop.
//
// ## Crash Behavior
//
// - All state is lost on restart/crash
// - The first address seen after a restart is always treated as changed
//   and reported
//
// The state is owned by exactly one `ReportingAgent` and only mutated from
// within a tick, so it needs no locking.

use chrono::{DateTime, Utc};
use std::net::Ipv6Addr;

/// A single report attempt, kept for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportAttempt {
    /// The address that was reported
    pub address: Ipv6Addr,
    /// When the attempt finished
    pub at: DateTime<Utc>,
    /// Whether the server accepted the report
    pub succeeded: bool,
}

/// State of a reporting loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentState {
    last_reported_address: Option<Ipv6Addr>,
    last_attempt: Option<ReportAttempt>,
}

impl AgentState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent address the loop committed after a report attempt
    pub fn last_reported_address(&self) -> Option<Ipv6Addr> {
        self.last_reported_address
    }

    /// The most recent report attempt, committed or not
    pub fn last_attempt(&self) -> Option<&ReportAttempt> {
        self.last_attempt.as_ref()
    }

    /// Whether `address` differs from the committed address
    pub fn is_new(&self, address: Ipv6Addr) -> bool {
        self.last_reported_address != Some(address)
    }

    /// Record a finished report attempt
    pub(crate) fn record_attempt(&mut self, address: Ipv6Addr, succeeded: bool) {
        self.last_attempt = Some(ReportAttempt {
            address,
            at: Utc::now(),
            succeeded,
        });
    }

    /// Commit `address` as the last reported address, returning the
    /// previous one
    pub(crate) fn commit(&mut self, address: Ipv6Addr) -> Option<Ipv6Addr> {
        self.last_reported_address.replace(address)
    }
}
