//! Netting a swapper's exchange against the desk.
//!
//! The desk never prices on its own: both legs of a take are quoted by the
//! swapper it trades with. Sizing:
//!
//! ```text
//! available       = available_for[wanted][offered]
//! took_from_pool  = min(available, quote(offered → wanted, amount))
//! took_from_swapper = quote(wanted → offered, took_from_pool)
//! ```

use serde::{Deserialize, Serialize};
use settla_domain::{Address, Amount, Event};
use settla_exec::{registry, SwapperPort};
use settla_store::Ledger;

use crate::error::{OtcError, OtcResult};

/// Both legs of a take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Take {
    /// Desk inventory handed to the swapper (in the swapper's wanted token)
    pub took_from_pool: Amount,
    /// Swapper tokens handed to the desk (in the swapper's offered token)
    pub took_from_swapper: Amount,
}

impl Take {
    /// Check for a zero-effect take
    pub fn is_empty(&self) -> bool {
        self.took_from_pool == 0 && self.took_from_swapper == 0
    }
}

/// Size a take without touching state
pub fn get_max_takeable_from_pool_and_swapper(
    ledger: &Ledger,
    pricing: &dyn SwapperPort,
    offered_by_swapper: Address,
    wanted_by_swapper: Address,
    offered_amount: Amount,
) -> OtcResult<Take> {
    let available = ledger.otc.available_for(wanted_by_swapper, offered_by_swapper);
    if available == 0 {
        return Ok(Take::default());
    }
    let wanted_via_swapper =
        pricing.total_amount_out(offered_by_swapper, wanted_by_swapper, offered_amount)?;
    let took_from_pool = available.min(wanted_via_swapper);
    if took_from_pool == 0 {
        return Ok(Take::default());
    }
    let took_from_swapper = pricing.total_amount_out(wanted_by_swapper, offered_by_swapper, took_from_pool)?;
    // The desk never gives inventory away for nothing.
    if took_from_swapper == 0 {
        return Ok(Take::default());
    }
    Ok(Take { took_from_pool, took_from_swapper })
}

/// Net part of a swapper's exchange against the desk.
///
/// A take against an empty bucket, or one whose quotes round either leg to
/// zero, is a no-op: no transfer, no signal. The swapper's second quote is re-read right before the transfers and the take
/// fails if it moved.
pub fn take_offer(
    ledger: &mut Ledger,
    pricing: &dyn SwapperPort,
    swapper: Address,
    offered_by_swapper: Address,
    wanted_by_swapper: Address,
    amount: Amount,
) -> OtcResult<Take> {
    if !registry::is_valid(ledger, swapper) {
        return Err(OtcError::NotSwapper(swapper));
    }
    if offered_by_swapper.is_zero() || wanted_by_swapper.is_zero() {
        return Err(OtcError::TokensZero);
    }
    if ledger.otc.available_for(wanted_by_swapper, offered_by_swapper) == 0 {
        tracing::debug!(%swapper, "Nothing offered for pair, take is a no-op");
        return Ok(Take::default());
    }

    let take = get_max_takeable_from_pool_and_swapper(
        ledger,
        pricing,
        offered_by_swapper,
        wanted_by_swapper,
        amount,
    )?;
    if take.is_empty() {
        tracing::debug!(%swapper, amount, "Take rounds to nothing, no-op");
        return Ok(take);
    }
    let actual = pricing.total_amount_out(wanted_by_swapper, offered_by_swapper, take.took_from_pool)?;
    if actual != take.took_from_swapper {
        return Err(OtcError::QuoteMoved { expected: take.took_from_swapper, actual });
    }

    let desk = ledger.otc.desk;
    ledger.tokens.transfer(offered_by_swapper, swapper, desk, take.took_from_swapper)?;
    ledger.tokens.transfer(wanted_by_swapper, desk, swapper, take.took_from_pool)?;
    ledger.otc.remove_offer(wanted_by_swapper, offered_by_swapper, take.took_from_pool)?;
    ledger.otc.add_swapped(offered_by_swapper, take.took_from_swapper)?;
    ledger.emit(Event::OtcOfferTaken {
        swapper,
        offered_by_swapper,
        wanted_by_swapper,
        took_from_pool: take.took_from_pool,
        took_from_swapper: take.took_from_swapper,
    });
    Ok(take)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use settla_domain::{Role, SwapperKind};
    use settla_exec::{access, StubSwapper, SwapContext, SwapError, SwapRequest};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    const GOVERNOR: u64 = 1;
    const SWAPPER: u64 = 50;
    const DESK: u64 = 0xd0;
    const TOKEN_A: u64 = 70;
    const TOKEN_B: u64 = 71;

    /// Desk offering 100 A for B; swapper holds 1_000 B
    fn ledger() -> Ledger {
        let mut ledger = Ledger::new(addr(0xe0), addr(DESK));
        access::initialize(&mut ledger, addr(GOVERNOR)).unwrap();
        access::grant(&mut ledger, addr(GOVERNOR), Role::SwapperAdder, addr(GOVERNOR)).unwrap();
        registry::add(&mut ledger, addr(GOVERNOR), addr(SWAPPER), None, SwapperKind::Sync, Utc::now()).unwrap();
        ledger.tokens.mint(addr(TOKEN_A), addr(DESK), 100).unwrap();
        ledger.otc.add_offer(addr(TOKEN_A), addr(TOKEN_B), 100).unwrap();
        ledger.tokens.mint(addr(TOKEN_B), addr(SWAPPER), 1_000).unwrap();
        ledger
    }

    fn parity() -> StubSwapper {
        StubSwapper::new(addr(SWAPPER), dec!(1))
    }

    #[test]
    fn test_max_takeable_swapper_side_binds() {
        let ledger = ledger();
        let take =
            get_max_takeable_from_pool_and_swapper(&ledger, &parity(), addr(TOKEN_B), addr(TOKEN_A), 40).unwrap();
        assert_eq!(take, Take { took_from_pool: 40, took_from_swapper: 40 });
    }

    #[test]
    fn test_max_takeable_pool_side_binds() {
        let ledger = ledger();
        let pricing = parity();
        pricing.set_rate(addr(TOKEN_B), addr(TOKEN_A), dec!(2));
        pricing.set_rate(addr(TOKEN_A), addr(TOKEN_B), dec!(0.5));

        let take =
            get_max_takeable_from_pool_and_swapper(&ledger, &pricing, addr(TOKEN_B), addr(TOKEN_A), 500).unwrap();
        assert_eq!(take, Take { took_from_pool: 100, took_from_swapper: 50 });
    }

    #[test]
    fn test_max_takeable_never_exceeds_available() {
        let ledger = ledger();
        let pricing = parity();
        for rate in [dec!(0.3), dec!(1), dec!(7.5)] {
            pricing.set_rate(addr(TOKEN_B), addr(TOKEN_A), rate);
            for amount in [1u128, 10, 99, 100, 101, 10_000] {
                let take = get_max_takeable_from_pool_and_swapper(
                    &ledger,
                    &pricing,
                    addr(TOKEN_B),
                    addr(TOKEN_A),
                    amount,
                )
                .unwrap();
                assert!(take.took_from_pool <= ledger.otc.available_for(addr(TOKEN_A), addr(TOKEN_B)));
            }
        }
    }

    #[test]
    fn test_take_offer_moves_both_legs() {
        let mut ledger = ledger();
        let take = take_offer(&mut ledger, &parity(), addr(SWAPPER), addr(TOKEN_B), addr(TOKEN_A), 40).unwrap();

        assert_eq!(take, Take { took_from_pool: 40, took_from_swapper: 40 });
        assert_eq!(ledger.otc.available_for(addr(TOKEN_A), addr(TOKEN_B)), 60);
        assert_eq!(ledger.otc.swapped_available(addr(TOKEN_B)), 40);
        assert_eq!(ledger.otc.tokens_under_management(addr(TOKEN_A)), 60);
        assert_eq!(ledger.otc.tokens_under_management(addr(TOKEN_B)), 40);
        assert_eq!(ledger.tokens.balance_of(addr(TOKEN_A), addr(SWAPPER)), 40);
        assert_eq!(ledger.tokens.balance_of(addr(TOKEN_B), addr(DESK)), 40);
        assert!(matches!(ledger.events.all().last().map(|e| &e.event), Some(Event::OtcOfferTaken { .. })));
    }

    #[test]
    fn test_take_offer_empty_bucket_is_noop() {
        let mut ledger = ledger();
        let events = ledger.events.len();
        let take = take_offer(&mut ledger, &parity(), addr(SWAPPER), addr(TOKEN_A), addr(TOKEN_B), 40).unwrap();

        assert!(take.is_empty());
        assert_eq!(ledger.events.len(), events);
        assert_eq!(ledger.tokens.balance_of(addr(TOKEN_B), addr(SWAPPER)), 1_000);
    }

    #[test]
    fn test_take_offer_requires_valid_swapper() {
        let mut ledger = ledger();
        assert!(matches!(
            take_offer(&mut ledger, &parity(), addr(77), addr(TOKEN_B), addr(TOKEN_A), 40),
            Err(OtcError::NotSwapper(_))
        ));
        registry::deprecate(&mut ledger, addr(GOVERNOR), addr(SWAPPER)).unwrap();
        assert!(matches!(
            take_offer(&mut ledger, &parity(), addr(SWAPPER), addr(TOKEN_B), addr(TOKEN_A), 40),
            Err(OtcError::NotSwapper(_))
        ));
    }

    /// Pricing whose reverse quote drifts by one unit on every call
    struct Drifting {
        calls: AtomicU32,
    }

    impl SwapperPort for Drifting {
        fn address(&self) -> Address {
            addr(SWAPPER)
        }

        fn kind(&self) -> SwapperKind {
            SwapperKind::Sync
        }

        fn swap(&self, _ctx: &mut SwapContext<'_>, _request: &SwapRequest) -> Result<Amount, SwapError> {
            Err(SwapError::Venue("pricing only".to_string()))
        }

        fn total_amount_out(&self, token_in: Address, _token_out: Address, amount_in: Amount) -> Result<Amount, SwapError> {
            if token_in == addr(TOKEN_A) {
                Ok(amount_in + u128::from(self.calls.fetch_add(1, Ordering::SeqCst)))
            } else {
                Ok(amount_in)
            }
        }
    }

    #[test]
    fn test_take_offer_rejects_moved_quote() {
        let mut ledger = ledger();
        let pricing = Drifting { calls: AtomicU32::new(0) };
        let result = take_offer(&mut ledger, &pricing, addr(SWAPPER), addr(TOKEN_B), addr(TOKEN_A), 40);
        assert!(matches!(result, Err(OtcError::QuoteMoved { expected: 40, actual: 41 })));
    }

    #[test]
    fn test_take_offer_rounding_to_free_inventory_is_noop() {
        let mut ledger = ledger();
        let pricing = parity();
        pricing.set_rate(addr(TOKEN_B), addr(TOKEN_A), dec!(1.5));
        pricing.set_rate(addr(TOKEN_A), addr(TOKEN_B), dec!(0.66));
        let events = ledger.events.len();

        for _ in 0..100 {
            let take = take_offer(&mut ledger, &pricing, addr(SWAPPER), addr(TOKEN_B), addr(TOKEN_A), 1).unwrap();
            assert!(take.is_empty());
        }

        assert_eq!(ledger.otc.available_for(addr(TOKEN_A), addr(TOKEN_B)), 100);
        assert_eq!(ledger.tokens.balance_of(addr(TOKEN_A), addr(DESK)), 100);
        assert_eq!(ledger.tokens.balance_of(addr(TOKEN_A), addr(SWAPPER)), 0);
        assert_eq!(ledger.events.len(), events);
    }

    #[test]
    fn test_zero_rate_takes_nothing_from_swapper() {
        let ledger = ledger();
        let pricing = StubSwapper::new(addr(SWAPPER), Decimal::ZERO);
        let take =
            get_max_takeable_from_pool_and_swapper(&ledger, &pricing, addr(TOKEN_B), addr(TOKEN_A), 40).unwrap();
        assert!(take.is_empty());
    }
}
