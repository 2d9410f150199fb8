//! Swapper records, name index, strategy assignments and executor approvals.

use crate::error::StoreError;
use settla_domain::{Address, Swapper, SwapperStatus};
use std::collections::{BTreeMap, BTreeSet};

/// Registered swappers. Records are never deleted.
#[derive(Debug, Clone, Default)]
pub struct SwapperTable {
    swappers: BTreeMap<Address, Swapper>,
    names: BTreeMap<String, Address>,
    strategy_swapper: BTreeMap<Address, Address>,
    approved_tokens: BTreeMap<Address, BTreeSet<Address>>,
}

impl SwapperTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record; address and name must both be unclaimed
    pub fn insert(&mut self, swapper: Swapper) -> Result<(), StoreError> {
        if self.swappers.contains_key(&swapper.address) {
            return Err(StoreError::duplicate("swapper", swapper.address.to_string()));
        }
        if let Some(name) = &swapper.name {
            if self.names.contains_key(name) {
                return Err(StoreError::duplicate("swapper name", name.clone()));
            }
            self.names.insert(name.clone(), swapper.address);
        }
        self.swappers.insert(swapper.address, swapper);
        Ok(())
    }

    /// Mark a swapper deprecated (idempotent)
    pub fn deprecate(&mut self, address: Address) -> Result<(), StoreError> {
        let swapper = self
            .swappers
            .get_mut(&address)
            .ok_or_else(|| StoreError::not_found("swapper", address.to_string()))?;
        swapper.status = SwapperStatus::Deprecated;
        Ok(())
    }

    /// Find by address
    pub fn get(&self, address: Address) -> Option<&Swapper> {
        self.swappers.get(&address)
    }

    /// Find by registered name
    pub fn by_name(&self, name: &str) -> Option<&Swapper> {
        self.names.get(name).and_then(|address| self.swappers.get(address))
    }

    /// Every record, ordered by address
    pub fn all(&self) -> Vec<Swapper> {
        self.swappers.values().cloned().collect()
    }

    /// Set the default swapper for a strategy
    pub fn assign(&mut self, strategy: Address, swapper: Address) {
        self.strategy_swapper.insert(strategy, swapper);
    }

    /// Default swapper of a strategy
    pub fn assigned(&self, strategy: Address) -> Option<Address> {
        self.strategy_swapper.get(&strategy).copied()
    }

    /// Record that the executor authorized `swapper` for `token`.
    /// Returns `false` if the pair was already recorded.
    pub fn approve_token(&mut self, swapper: Address, token: Address) -> bool {
        self.approved_tokens.entry(swapper).or_default().insert(token)
    }

    /// Check the (swapper, token) authorization record
    pub fn is_token_approved(&self, swapper: Address, token: Address) -> bool {
        self.approved_tokens.get(&swapper).map(|t| t.contains(&token)).unwrap_or(false)
    }

    /// Tokens the executor authorized for a swapper
    pub fn approved_tokens(&self, swapper: Address) -> Vec<Address> {
        self.approved_tokens
            .get(&swapper)
            .map(|t| t.iter().copied().collect())
            .unwrap_or_default()
    }
}
