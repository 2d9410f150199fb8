//! In-memory store implementation
//!
//! Used for tests, journal replay and embedding.
//! Writers are serialized by the `RwLock`; each transaction works on a clone
//! of live state. History sits behind its own lock and is only appended to.

use crate::error::StoreError;
use crate::history::History;
use crate::ledger::Ledger;
use crate::repository::Store;
use std::sync::RwLock;

/// In-memory store
pub struct MemoryStore {
    ledger: RwLock<Ledger>,
    history: RwLock<History>,
}

impl MemoryStore {
    /// Create a store seeded with a ledger
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger: RwLock::new(ledger), history: RwLock::new(History::new()) }
    }

    /// Clone of the committed ledger
    pub fn snapshot(&self) -> Result<Ledger, StoreError> {
        self.read(Ledger::clone)
    }

    /// Get the number of committed events
    pub fn event_count(&self) -> Result<usize, StoreError> {
        self.history(History::event_count)
    }
}

impl Store for MemoryStore {
    fn read<T>(&self, query: impl FnOnce(&Ledger) -> T) -> Result<T, StoreError> {
        let ledger = self
            .ledger
            .read()
            .map_err(|e| StoreError::Lock(format!("Failed to acquire read lock: {}", e)))?;
        Ok(query(&ledger))
    }

    fn history<T>(&self, query: impl FnOnce(&History) -> T) -> Result<T, StoreError> {
        let history = self
            .history
            .read()
            .map_err(|e| StoreError::Lock(format!("Failed to acquire history read lock: {}", e)))?;
        Ok(query(&history))
    }

    fn transact<T, E>(&self, operation: impl FnOnce(&mut Ledger) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut committed = self
            .ledger
            .write()
            .map_err(|e| StoreError::Lock(format!("Failed to acquire write lock: {}", e)))?;

        let mut working = committed.clone();
        let output = operation(&mut working)?;

        let events = working.events.drain();
        let settled = working.trades.drain_settled();
        self.history
            .write()
            .map_err(|e| StoreError::Lock(format!("Failed to acquire history write lock: {}", e)))?
            .record(events, settled);
        *committed = working;
        Ok(output)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use settla_domain::{Address, Event, PendingTrade, Settlement, Slippage, TradeState};

    fn store() -> MemoryStore {
        MemoryStore::new(Ledger::new(Address::from_low_u64(0xe0), Address::from_low_u64(0xd0)))
    }

    #[test]
    fn test_transact_commits_on_ok() {
        let store = store();
        let token = Address::from_low_u64(1);

        store
            .transact(|ledger| -> Result<(), StoreError> {
                ledger.tokens.mint(token, ledger.executor, 5).map_err(|e| StoreError::invalid_state(e.to_string()))?;
                ledger.emit(Event::TradeExpired { id: 1 });
                Ok(())
            })
            .unwrap();

        assert_eq!(store.read(|l| l.tokens.balance_of(token, l.executor)).unwrap(), 5);
        assert_eq!(store.event_count().unwrap(), 1);
    }

    #[test]
    fn test_transact_rolls_back_on_err() {
        let store = store();
        let token = Address::from_low_u64(1);

        let result = store.transact(|ledger| -> Result<(), StoreError> {
            ledger.tokens.mint(token, ledger.executor, 5).map_err(|e| StoreError::invalid_state(e.to_string()))?;
            ledger.emit(Event::TradeExpired { id: 1 });
            Err(StoreError::invalid_state("abort"))
        });

        assert!(result.is_err());
        assert_eq!(store.read(|l| l.tokens.balance_of(token, l.executor)).unwrap(), 0);
        assert_eq!(store.event_count().unwrap(), 0);
    }

    #[test]
    fn test_trade_ids_survive_rollback_only_when_committed() {
        let store = store();

        let _ = store.transact(|ledger| -> Result<(), StoreError> {
            ledger.trades.next_id()?;
            Err(StoreError::invalid_state("abort"))
        });
        let id = store.transact(|ledger| ledger.trades.next_id()).unwrap();

        assert_eq!(id, 1);
    }

    #[test]
    fn test_commit_moves_history_out_of_live_state() {
        let store = store();

        for id in 1..=3 {
            store
                .transact(|ledger| -> Result<(), StoreError> {
                    let now = Utc::now();
                    let trade = PendingTrade {
                        id: ledger.trades.next_id()?,
                        strategy: Address::from_low_u64(0x10),
                        swapper: Address::from_low_u64(0x50),
                        token_in: Address::from_low_u64(0x7a),
                        token_out: Address::from_low_u64(0x7b),
                        amount_in: 100,
                        max_slippage: Slippage::from_bps(100).unwrap(),
                        deadline: now + Duration::minutes(30),
                        created_at: now,
                    };
                    ledger.trades.insert(trade)?;
                    ledger.trades.settle(id, Settlement::Cancelled)?;
                    ledger.emit(Event::TradeCanceled { id, strategy: Address::from_low_u64(0x10) });
                    Ok(())
                })
                .unwrap();
        }

        let staged = store.read(|l| (l.events.len(), l.trades.record(1).is_some())).unwrap();
        assert_eq!(staged, (0, false));

        assert_eq!(store.event_count().unwrap(), 3);
        assert_eq!(store.history(|h| h.latest_seq()).unwrap(), Some(3));
        assert_eq!(store.history(|h| h.settled_count()).unwrap(), 3);
        assert_eq!(
            store.history(|h| h.settled(2).map(|r| r.state)).unwrap(),
            Some(TradeState::Settled(Settlement::Cancelled))
        );
    }

    #[test]
    fn test_rollback_leaves_history_untouched() {
        let store = store();
        store
            .transact(|ledger| -> Result<(), StoreError> {
                ledger.emit(Event::TradeExpired { id: 1 });
                Ok(())
            })
            .unwrap();

        let _ = store.transact(|ledger| -> Result<(), StoreError> {
            ledger.emit(Event::TradeExpired { id: 2 });
            Err(StoreError::invalid_state("abort"))
        });
        let seq = store
            .transact(|ledger| -> Result<i64, StoreError> { Ok(ledger.emit(Event::TradeExpired { id: 3 })) })
            .unwrap();

        assert_eq!(seq, 2);
        assert_eq!(store.history(|h| h.events_after(0).len()).unwrap(), 2);
    }
}
