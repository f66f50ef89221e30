//! Correlation table — activation requests waiting for a registration event.
//!
//! An entry *is* the subscription: inserting subscribes, removing
//! unsubscribes. Whoever removes an entry first (event or deadline) owns the
//! request's single completion; the other path finds nothing and does nothing.

use std::collections::HashMap;

use tokio::time::Instant;

use appwake_domain::id::{CorrelationId, HmiAppId};

/// State kept for one request in `AWAITING_LAUNCH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwaitingLaunch {
    /// Pending id the request targeted.
    pub target: HmiAppId,
    pub subscribed_at: Instant,
    pub deadline: Instant,
}

/// Requests awaiting registration, keyed by correlation id.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    entries: HashMap<CorrelationId, AwaitingLaunch>,
}

impl CorrelationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `correlation_id`.
    ///
    /// Returns `false` and leaves the existing entry untouched if the id is
    /// already waiting.
    pub fn subscribe(&mut self, correlation_id: CorrelationId, entry: AwaitingLaunch) -> bool {
        if self.entries.contains_key(&correlation_id) {
            return false;
        }
        self.entries.insert(correlation_id, entry);
        true
    }

    /// Unsubscribe one request, returning its entry if it was still waiting.
    pub fn unsubscribe(&mut self, correlation_id: CorrelationId) -> Option<AwaitingLaunch> {
        self.entries.remove(&correlation_id)
    }

    /// Unsubscribe every waiting request.
    pub fn unsubscribe_all(&mut self) -> Vec<(CorrelationId, AwaitingLaunch)> {
        let mut drained: Vec<_> = self.entries.drain().collect();
        drained.sort_by_key(|(_, entry)| entry.subscribed_at);
        drained
    }

    /// Unsubscribe every request whose deadline is at or before `now`.
    pub fn unsubscribe_expired(&mut self, now: Instant) -> Vec<CorrelationId> {
        let mut expired: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.deadline <= now)
            .map(|(id, entry)| (*id, entry.deadline))
            .collect();
        expired.sort_by_key(|(_, deadline)| *deadline);
        for (id, _) in &expired {
            self.entries.remove(id);
        }
        expired.into_iter().map(|(id, _)| id).collect()
    }

    /// Earliest deadline among waiting requests.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.values().map(|entry| entry.deadline).min()
    }

    #[must_use]
    pub fn is_awaiting(&self, correlation_id: CorrelationId) -> bool {
        self.entries.contains_key(&correlation_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
