//! Provider inventory: deposit, withdraw, claim.
//!
//! Every bucket change is paired with the matching `tokens_under_management`
//! change inside the same [`OtcBook`](settla_store::OtcBook) call.

use settla_domain::{Address, Amount, Event, Role};
use settla_exec::access;
use settla_store::Ledger;

use crate::error::{OtcError, OtcResult};

fn require_provider(ledger: &Ledger, caller: Address) -> OtcResult<Address> {
    let provider = ledger.otc.provider;
    if provider.is_zero() || provider != caller {
        return Err(OtcError::NotProvider(caller));
    }
    Ok(provider)
}

fn require_tokens(offered: Address, wanted: Address) -> OtcResult<()> {
    if offered.is_zero() || wanted.is_zero() {
        return Err(OtcError::TokensZero);
    }
    Ok(())
}

/// Replace the provider. Caller must hold Governor.
///
/// Only allowed while the desk holds nothing for the current provider, so
/// custody never changes hands.
pub fn set_provider(ledger: &mut Ledger, caller: Address, provider: Address) -> OtcResult<()> {
    access::require(ledger, Role::Governor, caller)?;
    if provider.is_zero() {
        return Err(OtcError::ZeroAddress);
    }
    let current = ledger.otc.provider;
    if current != provider && ledger.otc.holds_custody() {
        return Err(OtcError::ProviderHasCustody { provider: current });
    }
    ledger.otc.provider = provider;
    ledger.emit(Event::OtcProviderSet { provider });
    Ok(())
}

/// Move provider inventory into the desk, offered against `wanted`
pub fn deposit(
    ledger: &mut Ledger,
    caller: Address,
    offered: Address,
    wanted: Address,
    amount: Amount,
) -> OtcResult<()> {
    let provider = require_provider(ledger, caller)?;
    require_tokens(offered, wanted)?;
    if amount == 0 {
        return Err(OtcError::AmountZero("should provide more than zero"));
    }
    let desk = ledger.otc.desk;
    ledger.tokens.transfer(offered, provider, desk, amount)?;
    ledger.otc.add_offer(offered, wanted, amount)?;
    ledger.emit(Event::OtcDeposited { provider, offered_token: offered, wanted_token: wanted, amount });
    Ok(())
}

/// Return inventory from an offer bucket to the provider
pub fn withdraw(
    ledger: &mut Ledger,
    caller: Address,
    offered: Address,
    wanted: Address,
    amount: Amount,
) -> OtcResult<()> {
    let provider = require_provider(ledger, caller)?;
    require_tokens(offered, wanted)?;
    if amount == 0 {
        return Err(OtcError::AmountZero("should withdraw more than zero"));
    }
    let available = ledger.otc.available_for(offered, wanted);
    if amount > available {
        return Err(OtcError::NotEnoughProvided { requested: amount, available });
    }
    ledger.otc.remove_offer(offered, wanted, amount)?;
    let desk = ledger.otc.desk;
    ledger.tokens.transfer(offered, desk, provider, amount)?;
    ledger.emit(Event::OtcWithdrawn { provider, offered_token: offered, wanted_token: wanted, amount });
    Ok(())
}

/// Pay out tokens the desk acquired in trades
pub fn claim(ledger: &mut Ledger, caller: Address, token: Address, amount: Amount) -> OtcResult<()> {
    let provider = require_provider(ledger, caller)?;
    if token.is_zero() {
        return Err(OtcError::ZeroAddress);
    }
    let claimable = ledger.otc.swapped_available(token);
    if amount == 0 || amount > claimable {
        return Err(OtcError::ZeroClaim { requested: amount, claimable });
    }
    ledger.otc.remove_swapped(token, amount)?;
    let desk = ledger.otc.desk;
    ledger.tokens.transfer(token, desk, provider, amount)?;
    ledger.emit(Event::OtcClaimed { provider, token, amount });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    const GOVERNOR: u64 = 1;
    const PROVIDER: u64 = 2;
    const DESK: u64 = 0xd0;
    const TOKEN_A: u64 = 70;
    const TOKEN_B: u64 = 71;

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new(addr(0xe0), addr(DESK));
        access::initialize(&mut ledger, addr(GOVERNOR)).unwrap();
        set_provider(&mut ledger, addr(GOVERNOR), addr(PROVIDER)).unwrap();
        ledger.tokens.mint(addr(TOKEN_A), addr(PROVIDER), 1_000).unwrap();
        ledger
    }

    #[test]
    fn test_set_provider_requires_governor() {
        let mut ledger = ledger();
        assert!(matches!(
            set_provider(&mut ledger, addr(PROVIDER), addr(9)),
            Err(OtcError::Factory(_))
        ));
        assert!(matches!(set_provider(&mut ledger, addr(GOVERNOR), Address::ZERO), Err(OtcError::ZeroAddress)));
    }

    #[test]
    fn test_set_provider_refused_while_desk_holds_custody() {
        let mut ledger = ledger();
        deposit(&mut ledger, addr(PROVIDER), addr(TOKEN_A), addr(TOKEN_B), 100).unwrap();

        assert!(matches!(
            set_provider(&mut ledger, addr(GOVERNOR), addr(0x77)),
            Err(OtcError::ProviderHasCustody { .. })
        ));
        assert!(matches!(
            withdraw(&mut ledger, addr(0x77), addr(TOKEN_A), addr(TOKEN_B), 100),
            Err(OtcError::NotProvider(_))
        ));

        withdraw(&mut ledger, addr(PROVIDER), addr(TOKEN_A), addr(TOKEN_B), 100).unwrap();
        set_provider(&mut ledger, addr(GOVERNOR), addr(0x77)).unwrap();
        assert_eq!(ledger.otc.provider, addr(0x77));
    }

    #[test]
    fn test_deposit_moves_custody() {
        let mut ledger = ledger();
        deposit(&mut ledger, addr(PROVIDER), addr(TOKEN_A), addr(TOKEN_B), 100).unwrap();

        assert_eq!(ledger.otc.available_for(addr(TOKEN_A), addr(TOKEN_B)), 100);
        assert_eq!(ledger.otc.tokens_under_management(addr(TOKEN_A)), 100);
        assert_eq!(ledger.tokens.balance_of(addr(TOKEN_A), addr(DESK)), 100);
        assert_eq!(ledger.tokens.balance_of(addr(TOKEN_A), addr(PROVIDER)), 900);
    }

    #[test]
    fn test_deposit_rejections() {
        let mut ledger = ledger();
        assert!(matches!(
            deposit(&mut ledger, addr(9), addr(TOKEN_A), addr(TOKEN_B), 1),
            Err(OtcError::NotProvider(_))
        ));
        assert!(matches!(
            deposit(&mut ledger, addr(PROVIDER), Address::ZERO, addr(TOKEN_B), 1),
            Err(OtcError::TokensZero)
        ));
        assert!(matches!(
            deposit(&mut ledger, addr(PROVIDER), addr(TOKEN_A), addr(TOKEN_B), 0),
            Err(OtcError::AmountZero("should provide more than zero"))
        ));
    }

    #[test]
    fn test_withdraw_bounds() {
        let mut ledger = ledger();
        deposit(&mut ledger, addr(PROVIDER), addr(TOKEN_A), addr(TOKEN_B), 100).unwrap();

        assert!(matches!(
            withdraw(&mut ledger, addr(PROVIDER), addr(TOKEN_A), addr(TOKEN_B), 0),
            Err(OtcError::AmountZero("should withdraw more than zero"))
        ));
        assert!(matches!(
            withdraw(&mut ledger, addr(PROVIDER), addr(TOKEN_A), addr(TOKEN_B), 101),
            Err(OtcError::NotEnoughProvided { requested: 101, available: 100 })
        ));
        withdraw(&mut ledger, addr(PROVIDER), addr(TOKEN_A), addr(TOKEN_B), 40).unwrap();
        assert_eq!(ledger.otc.available_for(addr(TOKEN_A), addr(TOKEN_B)), 60);
        assert_eq!(ledger.tokens.balance_of(addr(TOKEN_A), addr(PROVIDER)), 940);
    }

    #[test]
    fn test_claim_bounds() {
        let mut ledger = ledger();
        ledger.tokens.mint(addr(TOKEN_B), addr(DESK), 40).unwrap();
        ledger.otc.add_swapped(addr(TOKEN_B), 40).unwrap();

        assert!(matches!(
            claim(&mut ledger, addr(PROVIDER), addr(TOKEN_B), 41),
            Err(OtcError::ZeroClaim { requested: 41, claimable: 40 })
        ));
        assert!(matches!(claim(&mut ledger, addr(PROVIDER), Address::ZERO, 1), Err(OtcError::ZeroAddress)));

        claim(&mut ledger, addr(PROVIDER), addr(TOKEN_B), 40).unwrap();
        assert_eq!(ledger.otc.swapped_available(addr(TOKEN_B)), 0);
        assert_eq!(ledger.otc.tokens_under_management(addr(TOKEN_B)), 0);
        assert_eq!(ledger.tokens.balance_of(addr(TOKEN_B), addr(PROVIDER)), 40);
    }
}
