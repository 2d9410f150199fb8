//! Pending-trade book.
//!
//! Map of open trades plus two secondary indices (global pending set,
//! pending set per strategy). Each mutation updates all three structures
//! together; nothing outside this module can touch them. Settled trades are
//! staged until the store moves them to its history on commit.

use crate::error::StoreError;
use settla_domain::{Address, PendingTrade, Settlement, TradeId, TradeRecord, TradeState};
use std::collections::{BTreeMap, BTreeSet};

/// Open trades, pending indices and trades settled in this transaction
#[derive(Debug, Clone, Default)]
pub struct TradeBook {
    last_id: TradeId,
    last_inserted: TradeId,
    open: BTreeMap<TradeId, PendingTrade>,
    pending: BTreeSet<TradeId>,
    pending_by_strategy: BTreeMap<Address, BTreeSet<TradeId>>,
    settled: Vec<TradeRecord>,
}

impl TradeBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next identifier (first is 1)
    pub fn next_id(&mut self) -> Result<TradeId, StoreError> {
        let id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Overflow("trade id".to_string()))?;
        self.last_id = id;
        Ok(id)
    }

    /// Last identifier handed out (0 if none)
    pub fn last_id(&self) -> TradeId {
        self.last_id
    }

    /// Insert a freshly created trade into the map and both indices.
    /// Ids are inserted in allocation order, so an id at or below the last
    /// inserted one is a reuse.
    pub fn insert(&mut self, trade: PendingTrade) -> Result<(), StoreError> {
        if trade.id == 0 || trade.id > self.last_id {
            return Err(StoreError::invalid_state(format!("trade id {} was not allocated", trade.id)));
        }
        if trade.id <= self.last_inserted {
            return Err(StoreError::duplicate("trade", trade.id.to_string()));
        }
        self.last_inserted = trade.id;
        self.pending.insert(trade.id);
        self.pending_by_strategy.entry(trade.strategy).or_default().insert(trade.id);
        self.open.insert(trade.id, trade);
        Ok(())
    }

    /// Move a pending trade to its terminal state, dropping it from both indices
    pub fn settle(&mut self, id: TradeId, settlement: Settlement) -> Result<PendingTrade, StoreError> {
        let trade = self
            .open
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("pending trade", id.to_string()))?;

        self.pending.remove(&id);
        if let Some(ids) = self.pending_by_strategy.get_mut(&trade.strategy) {
            ids.remove(&id);
            if ids.is_empty() {
                self.pending_by_strategy.remove(&trade.strategy);
            }
        }
        self.settled.push(TradeRecord { trade: trade.clone(), state: TradeState::Settled(settlement) });
        Ok(trade)
    }

    /// Reassign the swapper of a pending trade
    pub fn set_swapper(&mut self, id: TradeId, swapper: Address) -> Result<(), StoreError> {
        let trade = self
            .open
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("pending trade", id.to_string()))?;
        trade.swapper = swapper;
        Ok(())
    }

    /// Pending trade by id
    pub fn pending(&self, id: TradeId) -> Option<&PendingTrade> {
        self.open.get(&id)
    }

    /// Trade by id if open or settled in this transaction
    pub fn record(&self, id: TradeId) -> Option<TradeRecord> {
        if let Some(trade) = self.open.get(&id) {
            return Some(TradeRecord { trade: trade.clone(), state: TradeState::Pending });
        }
        self.settled.iter().find(|r| r.trade.id == id).cloned()
    }

    /// Take the trades settled since the last drain
    pub fn drain_settled(&mut self) -> Vec<TradeRecord> {
        std::mem::take(&mut self.settled)
    }

    /// Every pending id, ascending
    pub fn pending_ids(&self) -> Vec<TradeId> {
        self.pending.iter().copied().collect()
    }

    /// Pending ids owned by a strategy, ascending
    pub fn pending_ids_by_strategy(&self, strategy: Address) -> Vec<TradeId> {
        self.pending_by_strategy
            .get(&strategy)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Verify map ⇔ global set ⇔ strategy sets agree
    pub fn check_consistency(&self) -> Result<(), StoreError> {
        let from_map: BTreeSet<TradeId> = self.open.keys().copied().collect();
        if from_map != self.pending {
            return Err(StoreError::invalid_state("global pending index diverged from trade map"));
        }

        let mut from_strategies = BTreeSet::new();
        for (strategy, ids) in &self.pending_by_strategy {
            for id in ids {
                let owner = self.open.get(id).map(|t| t.strategy);
                if owner != Some(*strategy) || !from_strategies.insert(*id) {
                    return Err(StoreError::invalid_state(format!(
                        "trade {} indexed under the wrong strategy",
                        id
                    )));
                }
            }
        }
        if from_strategies != self.pending {
            return Err(StoreError::invalid_state("strategy index diverged from pending index"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use settla_domain::Slippage;

    fn trade(book: &mut TradeBook, strategy: u64) -> PendingTrade {
        let now = Utc::now();
        PendingTrade {
            id: book.next_id().unwrap(),
            strategy: Address::from_low_u64(strategy),
            swapper: Address::from_low_u64(50),
            token_in: Address::from_low_u64(60),
            token_out: Address::from_low_u64(61),
            amount_in: 100,
            max_slippage: Slippage::from_bps(100).unwrap(),
            deadline: now + Duration::minutes(30),
            created_at: now,
        }
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut book = TradeBook::new();
        assert_eq!(book.next_id().unwrap(), 1);
        assert_eq!(book.next_id().unwrap(), 2);
        assert_eq!(book.last_id(), 2);
    }

    #[test]
    fn test_insert_and_settle_keep_indices_consistent() {
        let mut book = TradeBook::new();
        let a = trade(&mut book, 1);
        let b = trade(&mut book, 1);
        let c = trade(&mut book, 2);
        book.insert(a.clone()).unwrap();
        book.insert(b.clone()).unwrap();
        book.insert(c.clone()).unwrap();
        book.check_consistency().unwrap();

        assert_eq!(book.pending_ids(), vec![1, 2, 3]);
        assert_eq!(book.pending_ids_by_strategy(Address::from_low_u64(1)), vec![1, 2]);

        book.settle(a.id, Settlement::Cancelled).unwrap();
        book.check_consistency().unwrap();
        assert_eq!(book.pending_ids(), vec![2, 3]);
        assert!(book.pending(a.id).is_none());
        assert_eq!(book.record(a.id).unwrap().state, TradeState::Settled(Settlement::Cancelled));
    }

    #[test]
    fn test_settle_twice_fails() {
        let mut book = TradeBook::new();
        let a = trade(&mut book, 1);
        book.insert(a.clone()).unwrap();
        book.settle(a.id, Settlement::Expired { freed: 100 }).unwrap();

        assert!(matches!(
            book.settle(a.id, Settlement::Cancelled),
            Err(StoreError::NotFound { .. })
        ));
        assert!(book.pending_ids_by_strategy(Address::from_low_u64(1)).is_empty());
    }

    #[test]
    fn test_insert_rejects_reused_id() {
        let mut book = TradeBook::new();
        let a = trade(&mut book, 1);
        book.insert(a.clone()).unwrap();
        book.settle(a.id, Settlement::Cancelled).unwrap();
        assert!(matches!(book.insert(a), Err(StoreError::Duplicate { .. })));
    }

    #[test]
    fn test_drain_settled_empties_stage() {
        let mut book = TradeBook::new();
        let a = trade(&mut book, 1);
        book.insert(a.clone()).unwrap();
        book.settle(a.id, Settlement::Expired { freed: 0 }).unwrap();

        let drained = book.drain_settled();
        assert_eq!(drained.len(), 1);
        assert!(book.record(a.id).is_none());
        assert!(book.drain_settled().is_empty());
    }

    #[test]
    fn test_set_swapper_only_on_pending() {
        let mut book = TradeBook::new();
        let a = trade(&mut book, 1);
        book.insert(a.clone()).unwrap();
        book.set_swapper(a.id, Address::from_low_u64(77)).unwrap();
        assert_eq!(book.pending(a.id).unwrap().swapper, Address::from_low_u64(77));

        book.settle(a.id, Settlement::Cancelled).unwrap();
        assert!(book.set_swapper(a.id, Address::from_low_u64(78)).is_err());
    }
}
