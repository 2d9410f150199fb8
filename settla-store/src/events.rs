//! Sequenced events staged by a transaction.
//!
//! A ledger only carries the events of the transaction in flight. The store
//! moves them to its [`History`](crate::History) on commit, so the working
//! copy stays the size of live state.

use settla_domain::Event;

/// Event with sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    /// Sequence number, starting at 1
    pub seq: i64,
    /// The event
    pub event: Event,
}

/// Events emitted since the last commit
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    last_seq: i64,
    staged: Vec<StoredEvent>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, returning its sequence number
    pub fn append(&mut self, event: Event) -> i64 {
        self.last_seq += 1;
        self.staged.push(StoredEvent { seq: self.last_seq, event });
        self.last_seq
    }

    /// Number of staged events
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    /// Check for no staged events
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Latest sequence number handed out, staged or committed
    pub fn latest_seq(&self) -> Option<i64> {
        (self.last_seq > 0).then_some(self.last_seq)
    }

    /// Staged events, in order
    pub fn all(&self) -> &[StoredEvent] {
        &self.staged
    }

    /// Take the staged events, keeping the sequence counter
    pub fn drain(&mut self) -> Vec<StoredEvent> {
        std::mem::take(&mut self.staged)
    }
}
