//! Stub swapper implementations for testing.
//!
//! These adapters simulate a venue with their own token inventory. The
//! inventory lives in the ledger under the swapper's address, so it must be
//! minted there before a swap can fill.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use settla_domain::{Address, Amount, SwapperKind};

use crate::error::SwapError;
use crate::ports::{SwapContext, SwapRequest, SwapperPort};

/// Convert `amount * rate` to whole units, rounding down
fn apply_rate(amount: Amount, rate: Decimal) -> Result<Amount, SwapError> {
    let amount = Decimal::from_u128(amount)
        .ok_or_else(|| SwapError::Venue(format!("amount {} out of range", amount)))?;
    amount
        .checked_mul(rate)
        .and_then(|out| out.floor().to_u128())
        .ok_or_else(|| SwapError::Venue("rate overflow".to_string()))
}

/// Pull `amount_in` from the payer into the venue's custody
fn pull_input(ctx: &mut SwapContext<'_>, venue: Address, request: &SwapRequest) -> Result<(), SwapError> {
    ctx.ledger.tokens.transfer_from(
        request.token_in,
        venue,
        request.payer,
        venue,
        request.amount_in,
    )?;
    Ok(())
}

// =============================================================================
// Stub Swapper
// =============================================================================

/// Synchronous swapper filling at configured rates.
///
/// Rates are `token_out` units per `token_in` unit. A fill factor below one
/// simulates price movement between quote and fill.
pub struct StubSwapper {
    address: Address,
    /// Rates by (token_in, token_out)
    rates: RwLock<HashMap<(Address, Address), Decimal>>,
    /// Rate for pairs without an explicit entry
    default_rate: Decimal,
    /// Fraction of the quote actually delivered
    fill_factor: RwLock<Decimal>,
    /// Whether to simulate a venue failure
    fail_next: RwLock<bool>,
}

impl StubSwapper {
    /// Create a stub swapper with a default rate
    pub fn new(address: Address, default_rate: Decimal) -> Self {
        Self {
            address,
            rates: RwLock::new(HashMap::new()),
            default_rate,
            fill_factor: RwLock::new(Decimal::ONE),
            fail_next: RwLock::new(false),
        }
    }

    /// Set the rate for a pair
    pub fn set_rate(&self, token_in: Address, token_out: Address, rate: Decimal) {
        let mut rates = self.rates.write().unwrap_or_else(|e| e.into_inner());
        rates.insert((token_in, token_out), rate);
    }

    /// Rate for a pair (or the default)
    pub fn rate(&self, token_in: Address, token_out: Address) -> Decimal {
        let rates = self.rates.read().unwrap_or_else(|e| e.into_inner());
        rates.get(&(token_in, token_out)).copied().unwrap_or(self.default_rate)
    }

    /// Deliver only `factor` of each quote
    pub fn set_fill_factor(&self, factor: Decimal) {
        *self.fill_factor.write().unwrap_or_else(|e| e.into_inner()) = factor;
    }

    /// Configure the next swap to fail
    pub fn set_fail_next(&self, fail: bool) {
        *self.fail_next.write().unwrap_or_else(|e| e.into_inner()) = fail;
    }

    fn should_fail(&self) -> bool {
        let mut fail_next = self.fail_next.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *fail_next, false)
    }
}

impl SwapperPort for StubSwapper {
    fn address(&self) -> Address {
        self.address
    }

    fn kind(&self) -> SwapperKind {
        SwapperKind::Sync
    }

    fn swap(&self, ctx: &mut SwapContext<'_>, request: &SwapRequest) -> Result<Amount, SwapError> {
        if self.should_fail() {
            return Err(SwapError::Venue("Simulated venue failure".to_string()));
        }
        let quote = self.total_amount_out(request.token_in, request.token_out, request.amount_in)?;
        let fill_factor = *self.fill_factor.read().unwrap_or_else(|e| e.into_inner());
        let amount_out = apply_rate(quote, fill_factor)?;

        let min_out = request.max_slippage.min_out(quote);
        if amount_out < min_out {
            return Err(SwapError::SlippageExceeded { min_out, amount_out });
        }

        pull_input(ctx, self.address, request)?;
        ctx.ledger
            .tokens
            .transfer(request.token_out, self.address, request.receiver, amount_out)?;
        Ok(amount_out)
    }

    fn total_amount_out(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: Amount,
    ) -> Result<Amount, SwapError> {
        apply_rate(amount_in, self.rate(token_in, token_out))
    }
}

// =============================================================================
// Quoted Swapper
// =============================================================================

/// Fill data understood by [`QuotedSwapper`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Output the off-chain solver committed to
    pub amount_out: Amount,
}

/// Asynchronous swapper whose price is fixed off-chain.
///
/// The mechanic passes the solver's [`Quote`] as fill data at execution.
/// It cannot quote on demand.
pub struct QuotedSwapper {
    address: Address,
}

impl QuotedSwapper {
    /// Create a quoted swapper
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

impl SwapperPort for QuotedSwapper {
    fn address(&self) -> Address {
        self.address
    }

    fn kind(&self) -> SwapperKind {
        SwapperKind::Async
    }

    fn swap(&self, ctx: &mut SwapContext<'_>, request: &SwapRequest) -> Result<Amount, SwapError> {
        let quote: Quote = request.fill_data.as_ref().ok_or(SwapError::MissingFillData)?.decode()?;
        if quote.amount_out == 0 {
            return Err(SwapError::InvalidFillData("zero amount_out".to_string()));
        }
        pull_input(ctx, self.address, request)?;
        ctx.ledger
            .tokens
            .transfer(request.token_out, self.address, request.receiver, quote.amount_out)?;
        Ok(quote.amount_out)
    }

    fn total_amount_out(
        &self,
        token_in: Address,
        token_out: Address,
        _amount_in: Amount,
    ) -> Result<Amount, SwapError> {
        Err(SwapError::UnsupportedPair { token_in, token_out })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FillData;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use settla_domain::Slippage;
    use settla_store::Ledger;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    const PAYER: u64 = 0xe0;
    const VENUE: u64 = 50;
    const TOKEN_IN: u64 = 70;
    const TOKEN_OUT: u64 = 71;

    fn funded_ledger(amount_in: Amount, inventory: Amount) -> Ledger {
        let mut ledger = Ledger::new(addr(PAYER), addr(0xd0));
        ledger.tokens.mint(addr(TOKEN_IN), addr(PAYER), amount_in).unwrap();
        ledger.tokens.mint(addr(TOKEN_OUT), addr(VENUE), inventory).unwrap();
        ledger.tokens.approve(addr(TOKEN_IN), addr(PAYER), addr(VENUE), amount_in);
        ledger
    }

    fn request(amount_in: Amount, fill_data: Option<FillData>) -> SwapRequest {
        SwapRequest {
            payer: addr(PAYER),
            receiver: addr(PAYER),
            token_in: addr(TOKEN_IN),
            token_out: addr(TOKEN_OUT),
            amount_in,
            max_slippage: Slippage::from_bps(100).unwrap(),
            fill_data,
        }
    }

    #[test]
    fn test_stub_swapper_fills_at_rate() {
        let swapper = StubSwapper::new(addr(VENUE), dec!(2.5));
        let mut ledger = funded_ledger(100, 1_000);

        let out = swapper
            .swap(&mut SwapContext { ledger: &mut ledger, now: Utc::now() }, &request(100, None))
            .unwrap();
        assert_eq!(out, 250);
        assert_eq!(ledger.tokens.balance_of(addr(TOKEN_OUT), addr(PAYER)), 250);
        assert_eq!(ledger.tokens.balance_of(addr(TOKEN_IN), addr(VENUE)), 100);
        assert_eq!(ledger.tokens.allowance(addr(TOKEN_IN), addr(PAYER), addr(VENUE)), 0);
    }

    #[test]
    fn test_stub_swapper_slippage_guard() {
        let swapper = StubSwapper::new(addr(VENUE), dec!(1));
        swapper.set_fill_factor(dec!(0.98));
        let mut ledger = funded_ledger(1_000, 10_000);

        let result =
            swapper.swap(&mut SwapContext { ledger: &mut ledger, now: Utc::now() }, &request(1_000, None));
        assert_eq!(result, Err(SwapError::SlippageExceeded { min_out: 990, amount_out: 980 }));
    }

    #[test]
    fn test_stub_swapper_fail_next_resets() {
        let swapper = StubSwapper::new(addr(VENUE), dec!(1));
        swapper.set_fail_next(true);
        let mut ledger = funded_ledger(10, 100);

        let mut ctx = SwapContext { ledger: &mut ledger, now: Utc::now() };
        assert!(matches!(swapper.swap(&mut ctx, &request(10, None)), Err(SwapError::Venue(_))));
        assert_eq!(swapper.swap(&mut ctx, &request(10, None)).unwrap(), 10);
    }

    #[test]
    fn test_quoted_swapper_needs_fill_data() {
        let swapper = QuotedSwapper::new(addr(VENUE));
        let mut ledger = funded_ledger(10, 100);
        let mut ctx = SwapContext { ledger: &mut ledger, now: Utc::now() };

        assert_eq!(swapper.swap(&mut ctx, &request(10, None)), Err(SwapError::MissingFillData));

        let fill = FillData::encode(&Quote { amount_out: 42 }).unwrap();
        assert_eq!(swapper.swap(&mut ctx, &request(10, Some(fill))).unwrap(), 42);
        assert!(swapper.total_amount_out(addr(TOKEN_IN), addr(TOKEN_OUT), 10).is_err());
    }
}
