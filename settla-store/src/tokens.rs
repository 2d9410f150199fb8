//! Fungible token custody.
//!
//! Balances and allowances keyed by token, mirroring a standard
//! transfer/approve/balance interface. Amounts are in the token's smallest unit.

use crate::error::TransferError;
use settla_domain::{Address, Amount};
use std::collections::HashMap;

/// Balances and allowances for every token
#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    balances: HashMap<(Address, Address), Amount>,
    allowances: HashMap<(Address, Address, Address), Amount>,
}

impl TokenLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `holder` in `token`
    pub fn balance_of(&self, token: Address, holder: Address) -> Amount {
        self.balances.get(&(token, holder)).copied().unwrap_or(0)
    }

    /// Remaining amount `spender` may pull from `owner`
    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> Amount {
        self.allowances.get(&(token, owner, spender)).copied().unwrap_or(0)
    }

    /// Create new units out of thin air (seeding and venue inventory)
    pub fn mint(&mut self, token: Address, to: Address, amount: Amount) -> Result<(), TransferError> {
        self.credit(token, to, amount)
    }

    /// Set the allowance of `spender` over `owner`'s funds (overwrites)
    pub fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: Amount) {
        if amount == 0 {
            self.allowances.remove(&(token, owner, spender));
        } else {
            self.allowances.insert((token, owner, spender), amount);
        }
    }

    /// Move funds owned by `from`
    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        if amount == 0 {
            return Ok(());
        }
        self.debit(token, from, amount)?;
        self.credit(token, to, amount)
    }

    /// Move funds owned by `from` on behalf of `spender`, consuming allowance
    pub fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        if amount == 0 {
            return Ok(());
        }
        let allowed = self.allowance(token, from, spender);
        if allowed < amount {
            return Err(TransferError::InsufficientAllowance {
                token,
                owner: from,
                spender,
                needed: amount,
                available: allowed,
            });
        }
        self.transfer(token, from, to, amount)?;
        self.approve(token, from, spender, allowed - amount);
        Ok(())
    }

    fn debit(&mut self, token: Address, holder: Address, amount: Amount) -> Result<(), TransferError> {
        let available = self.balance_of(token, holder);
        if available < amount {
            return Err(TransferError::InsufficientBalance { token, holder, needed: amount, available });
        }
        let remaining = available - amount;
        if remaining == 0 {
            self.balances.remove(&(token, holder));
        } else {
            self.balances.insert((token, holder), remaining);
        }
        Ok(())
    }

    fn credit(&mut self, token: Address, holder: Address, amount: Amount) -> Result<(), TransferError> {
        if amount == 0 {
            return Ok(());
        }
        let updated = self
            .balance_of(token, holder)
            .checked_add(amount)
            .ok_or(TransferError::Overflow { token, holder })?;
        self.balances.insert((token, holder), updated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    #[test]
    fn test_transfer_moves_balance() {
        let mut ledger = TokenLedger::new();
        ledger.mint(addr(1), addr(10), 100).unwrap();
        ledger.transfer(addr(1), addr(10), addr(11), 40).unwrap();

        assert_eq!(ledger.balance_of(addr(1), addr(10)), 60);
        assert_eq!(ledger.balance_of(addr(1), addr(11)), 40);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut ledger = TokenLedger::new();
        ledger.mint(addr(1), addr(10), 5).unwrap();
        let result = ledger.transfer(addr(1), addr(10), addr(11), 6);
        assert!(matches!(result, Err(TransferError::InsufficientBalance { available: 5, .. })));
        assert_eq!(ledger.balance_of(addr(1), addr(10)), 5);
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut ledger = TokenLedger::new();
        ledger.mint(addr(1), addr(10), 100).unwrap();
        ledger.approve(addr(1), addr(10), addr(20), 70);

        ledger.transfer_from(addr(1), addr(20), addr(10), addr(20), 50).unwrap();
        assert_eq!(ledger.allowance(addr(1), addr(10), addr(20)), 20);

        let result = ledger.transfer_from(addr(1), addr(20), addr(10), addr(20), 21);
        assert!(matches!(result, Err(TransferError::InsufficientAllowance { available: 20, .. })));
    }

    #[test]
    fn test_mint_overflow() {
        let mut ledger = TokenLedger::new();
        ledger.mint(addr(1), addr(10), Amount::MAX).unwrap();
        assert!(matches!(ledger.mint(addr(1), addr(10), 1), Err(TransferError::Overflow { .. })));
    }

    #[test]
    fn test_zero_transfer_is_noop() {
        let mut ledger = TokenLedger::new();
        ledger.transfer(addr(1), addr(10), addr(11), 0).unwrap();
        ledger.transfer_from(addr(1), addr(20), addr(10), addr(11), 0).unwrap();
        assert_eq!(ledger.balance_of(addr(1), addr(11)), 0);
    }
}
