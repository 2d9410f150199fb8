//! OTC offer ledger for a single provider.
//!
//! `available_for[(offered, wanted)]` is what the provider will give up for
//! `wanted`; `tokens_under_management` is the desk's custody per token;
//! `swapped_available` is what the desk acquired in trades and owes the provider.

use crate::error::StoreError;
use settla_domain::{Address, Amount};
use std::collections::BTreeMap;

/// Offer buckets and provider-level counters
#[derive(Debug, Clone, Default)]
pub struct OtcBook {
    /// Liquidity provider (zero until configured)
    pub provider: Address,
    /// Custody account holding the desk's tokens
    pub desk: Address,
    available_for: BTreeMap<(Address, Address), Amount>,
    tokens_under_management: BTreeMap<Address, Amount>,
    swapped_available: BTreeMap<Address, Amount>,
}

fn add(map: &mut BTreeMap<Address, Amount>, key: Address, amount: Amount, what: &str) -> Result<(), StoreError> {
    let current = map.get(&key).copied().unwrap_or(0);
    let updated = current
        .checked_add(amount)
        .ok_or_else(|| StoreError::Overflow(format!("{} of {}", what, key)))?;
    map.insert(key, updated);
    Ok(())
}

fn sub(map: &mut BTreeMap<Address, Amount>, key: Address, amount: Amount, what: &str) -> Result<(), StoreError> {
    let current = map.get(&key).copied().unwrap_or(0);
    let updated = current.checked_sub(amount).ok_or_else(|| {
        StoreError::invalid_state(format!("{} of {} is {}, cannot remove {}", what, key, current, amount))
    })?;
    if updated == 0 {
        map.remove(&key);
    } else {
        map.insert(key, updated);
    }
    Ok(())
}

impl OtcBook {
    /// Create an empty book for a desk custody account
    pub fn new(desk: Address) -> Self {
        Self { desk, ..Self::default() }
    }

    /// Inventory offered for `wanted`
    pub fn available_for(&self, offered: Address, wanted: Address) -> Amount {
        self.available_for.get(&(offered, wanted)).copied().unwrap_or(0)
    }

    /// Desk custody of a token attributable to the provider
    pub fn tokens_under_management(&self, token: Address) -> Amount {
        self.tokens_under_management.get(&token).copied().unwrap_or(0)
    }

    /// Acquired balance claimable by the provider
    pub fn swapped_available(&self, token: Address) -> Amount {
        self.swapped_available.get(&token).copied().unwrap_or(0)
    }

    /// Check if the desk holds anything for the provider
    pub fn holds_custody(&self) -> bool {
        !self.tokens_under_management.is_empty()
    }

    /// Add inventory to a bucket and to the custody total
    pub fn add_offer(&mut self, offered: Address, wanted: Address, amount: Amount) -> Result<(), StoreError> {
        let current = self.available_for(offered, wanted);
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| StoreError::Overflow(format!("offer {} for {}", offered, wanted)))?;
        add(&mut self.tokens_under_management, offered, amount, "tokens under management")?;
        self.available_for.insert((offered, wanted), updated);
        Ok(())
    }

    /// Remove inventory from a bucket and from the custody total
    pub fn remove_offer(&mut self, offered: Address, wanted: Address, amount: Amount) -> Result<(), StoreError> {
        let current = self.available_for(offered, wanted);
        let updated = current.checked_sub(amount).ok_or_else(|| {
            StoreError::invalid_state(format!("offer {} for {} is {}, cannot remove {}", offered, wanted, current, amount))
        })?;
        sub(&mut self.tokens_under_management, offered, amount, "tokens under management")?;
        if updated == 0 {
            self.available_for.remove(&(offered, wanted));
        } else {
            self.available_for.insert((offered, wanted), updated);
        }
        Ok(())
    }

    /// Credit an acquired balance and the custody total
    pub fn add_swapped(&mut self, token: Address, amount: Amount) -> Result<(), StoreError> {
        add(&mut self.swapped_available, token, amount, "swapped available")?;
        add(&mut self.tokens_under_management, token, amount, "tokens under management")
    }

    /// Debit an acquired balance and the custody total
    pub fn remove_swapped(&mut self, token: Address, amount: Amount) -> Result<(), StoreError> {
        sub(&mut self.swapped_available, token, amount, "swapped available")?;
        sub(&mut self.tokens_under_management, token, amount, "tokens under management")
    }

    /// Sum of every bucket offering `token` plus its claimable balance
    pub fn accounted(&self, token: Address) -> Amount {
        let offered: Amount = self
            .available_for
            .iter()
            .filter(|((offered, _), _)| *offered == token)
            .map(|(_, amount)| *amount)
            .sum();
        offered + self.swapped_available(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    #[test]
    fn test_offer_roundtrip_restores_counters() {
        let mut book = OtcBook::new(addr(99));
        book.add_offer(addr(1), addr(2), 100).unwrap();
        assert_eq!(book.available_for(addr(1), addr(2)), 100);
        assert_eq!(book.tokens_under_management(addr(1)), 100);

        book.remove_offer(addr(1), addr(2), 100).unwrap();
        assert_eq!(book.available_for(addr(1), addr(2)), 0);
        assert_eq!(book.tokens_under_management(addr(1)), 0);
    }

    #[test]
    fn test_remove_more_than_offered_fails_untouched() {
        let mut book = OtcBook::new(addr(99));
        book.add_offer(addr(1), addr(2), 10).unwrap();
        assert!(book.remove_offer(addr(1), addr(2), 11).is_err());
        assert_eq!(book.available_for(addr(1), addr(2)), 10);
        assert_eq!(book.tokens_under_management(addr(1)), 10);
    }

    #[test]
    fn test_accounted_matches_management_total() {
        let mut book = OtcBook::new(addr(99));
        book.add_offer(addr(1), addr(2), 10).unwrap();
        book.add_offer(addr(1), addr(3), 5).unwrap();
        book.add_swapped(addr(1), 7).unwrap();
        assert_eq!(book.accounted(addr(1)), 22);
        assert_eq!(book.tokens_under_management(addr(1)), 22);

        book.remove_swapped(addr(1), 7).unwrap();
        assert_eq!(book.swapped_available(addr(1)), 0);
        assert_eq!(book.tokens_under_management(addr(1)), 15);

        book.remove_offer(addr(1), addr(2), 10).unwrap();
        assert!(book.holds_custody());
        book.remove_offer(addr(1), addr(3), 5).unwrap();
        assert!(!book.holds_custody());
    }
}
