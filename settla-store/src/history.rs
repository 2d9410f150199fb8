//! Committed history: the event log and settled trades.
//!
//! Append-only and outside the transactional working copy.

use settla_domain::{TradeId, TradeRecord};
use std::collections::BTreeMap;

use crate::events::StoredEvent;

/// Everything committed transactions have retired
#[derive(Debug, Clone, Default)]
pub struct History {
    events: Vec<StoredEvent>,
    settled: BTreeMap<TradeId, TradeRecord>,
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append what one transaction committed
    pub fn record(&mut self, events: Vec<StoredEvent>, settled: Vec<TradeRecord>) {
        self.events.extend(events);
        for record in settled {
            self.settled.insert(record.trade.id, record);
        }
    }

    /// Number of committed events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Latest committed sequence number
    pub fn latest_seq(&self) -> Option<i64> {
        self.events.last().map(|e| e.seq)
    }

    /// Events after a sequence number
    pub fn events_after(&self, after_seq: i64) -> Vec<StoredEvent> {
        let start = self.events.partition_point(|e| e.seq <= after_seq);
        self.events[start..].to_vec()
    }

    /// Events touching a trade
    pub fn trade_events(&self, id: TradeId) -> Vec<StoredEvent> {
        self.events
            .iter()
            .filter(|e| e.event.trade_ids().contains(&id))
            .cloned()
            .collect()
    }

    /// Settled trade by id
    pub fn settled(&self, id: TradeId) -> Option<&TradeRecord> {
        self.settled.get(&id)
    }

    /// Number of settled trades
    pub fn settled_count(&self) -> usize {
        self.settled.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settla_domain::Event;

    fn stored(seq: i64, event: Event) -> StoredEvent {
        StoredEvent { seq, event }
    }

    #[test]
    fn test_events_after_and_by_trade() {
        let mut history = History::new();
        history.record(
            vec![
                stored(1, Event::TradeExpired { id: 1 }),
                stored(2, Event::TradeExecuted { id: 2, received: 5 }),
                stored(3, Event::TradeExpired { id: 2 }),
            ],
            Vec::new(),
        );

        assert_eq!(history.events_after(1).len(), 2);
        assert_eq!(history.events_after(3).len(), 0);
        assert_eq!(history.trade_events(2).len(), 2);
        assert_eq!(history.latest_seq(), Some(3));
    }
}
