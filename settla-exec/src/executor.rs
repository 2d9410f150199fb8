//! Trade settlement.
//!
//! Executes or expires pending trades. Execution order inside one
//! transaction:
//!
//! ```text
//! pull amount_in from strategy → authorize swapper for exactly amount_in
//!   → swapper.swap(receiver = executor) → skim fee → release net to strategy
//! ```
//!
//! A swap that leaves any of the input behind is rejected.

use chrono::{DateTime, Utc};
use settla_domain::{Address, Amount, Event, Role, Settlement, TradeId};
use settla_store::Ledger;

use crate::access;
use crate::error::{FactoryError, FactoryResult, SwapError};
use crate::fees;
use crate::ports::{FillData, SwapContext, SwapRequest, SwapperSet};

/// Outcome of a successful execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    /// Trade identifier
    pub id: TradeId,
    /// Output delivered by the swapper
    pub gross: Amount,
    /// Fee routed to the fee receiver
    pub fee: Amount,
    /// Net amount credited to the strategy
    pub received: Amount,
}

/// Record that the executor authorized `swapper` for `token`.
///
/// Emits a signal only when the pair is recorded for the first time.
fn record_token_approval(ledger: &mut Ledger, swapper: Address, token: Address) {
    if ledger.swappers.approve_token(swapper, token) {
        ledger.emit(Event::SwapperTokenEnabled { swapper, token });
    }
}

/// Pre-authorize a swapper for a token ahead of its first trade.
/// Caller must hold SwapperSetter.
pub fn enable_swapper_token(
    ledger: &mut Ledger,
    caller: Address,
    swapper: Address,
    token: Address,
) -> FactoryResult<()> {
    access::require(ledger, Role::SwapperSetter, caller)?;
    if token.is_zero() {
        return Err(FactoryError::ZeroAddress);
    }
    if !crate::registry::is_valid(ledger, swapper) {
        return Err(FactoryError::InvalidSwapper(swapper.to_string()));
    }
    ledger.swappers.approve_token(swapper, token);
    ledger.emit(Event::SwapperTokenEnabled { swapper, token });
    Ok(())
}

/// Settle a pending trade through its swapper. Caller must hold Mechanic.
pub fn execute(
    ledger: &mut Ledger,
    adapters: &SwapperSet,
    caller: Address,
    id: TradeId,
    fill_data: Option<FillData>,
    now: DateTime<Utc>,
) -> FactoryResult<Execution> {
    access::require(ledger, Role::Mechanic, caller)?;
    let trade = ledger.trades.pending(id).cloned().ok_or(FactoryError::TradeNotPending(id))?;
    if trade.is_expired(now) {
        return Err(FactoryError::TradeExpired(id));
    }
    let registered = match ledger.swappers.get(trade.swapper) {
        None => return Err(FactoryError::UnknownSwapper(trade.swapper)),
        Some(swapper) if !swapper.is_active() => {
            return Err(FactoryError::DeprecatedSwapper(trade.swapper))
        },
        Some(swapper) => swapper.kind,
    };
    let adapter = adapters.get(trade.swapper)?;
    if adapter.kind() != registered {
        let installed = adapter.kind();
        return Err(SwapError::KindMismatch { swapper: trade.swapper, registered, installed }.into());
    }
    let executor = ledger.executor;
    let held_in = ledger.tokens.balance_of(trade.token_in, executor);

    ledger
        .tokens
        .transfer_from(trade.token_in, executor, trade.strategy, executor, trade.amount_in)?;

    record_token_approval(ledger, trade.swapper, trade.token_in);
    ledger.tokens.approve(trade.token_in, executor, trade.swapper, trade.amount_in);

    let before = ledger.tokens.balance_of(trade.token_out, executor);
    let request = SwapRequest {
        payer: executor,
        receiver: executor,
        token_in: trade.token_in,
        token_out: trade.token_out,
        amount_in: trade.amount_in,
        max_slippage: trade.max_slippage,
        fill_data,
    };
    let gross = adapter.swap(&mut SwapContext { ledger: &mut *ledger, now }, &request)?;

    let delivered = ledger.tokens.balance_of(trade.token_out, executor).saturating_sub(before);
    if delivered < gross {
        return Err(SwapError::Underdelivered { delivered, reported: gross }.into());
    }
    ledger.tokens.approve(trade.token_in, executor, trade.swapper, 0);

    let split = fees::process_fees(ledger, trade.swapper, trade.token_out, gross)?;
    ledger.tokens.transfer(trade.token_out, executor, trade.strategy, split.net)?;

    // The executor holds nothing once a settlement ends.
    let left = ledger.tokens.balance_of(trade.token_in, executor).saturating_sub(held_in);
    if left > 0 {
        return Err(SwapError::InputNotConsumed { left }.into());
    }

    ledger
        .trades
        .settle(id, Settlement::Executed { received: split.net, fee: split.fee })?;
    ledger.emit(Event::TradeExecuted { id, received: split.net });

    Ok(Execution { id, gross, fee: split.fee, received: split.net })
}

/// Retire a pending trade past its deadline. Caller must hold Mechanic.
///
/// Whatever the strategy still has authorized to the executor for the trade,
/// up to `amount_in`, is pulled and returned, so no allowance is left
/// stranded. Returns the amount freed.
pub fn expire(ledger: &mut Ledger, caller: Address, id: TradeId, now: DateTime<Utc>) -> FactoryResult<Amount> {
    access::require(ledger, Role::Mechanic, caller)?;
    let trade = ledger.trades.pending(id).cloned().ok_or(FactoryError::TradeNotPending(id))?;
    if !trade.is_expired(now) {
        return Err(FactoryError::TradeNotExpired(id));
    }
    let executor = ledger.executor;

    let freed = trade
        .amount_in
        .min(ledger.tokens.allowance(trade.token_in, trade.strategy, executor))
        .min(ledger.tokens.balance_of(trade.token_in, trade.strategy));
    ledger
        .tokens
        .transfer_from(trade.token_in, executor, trade.strategy, executor, freed)?;
    ledger.tokens.transfer(trade.token_in, executor, trade.strategy, freed)?;

    ledger.trades.settle(id, Settlement::Expired { freed })?;
    ledger.emit(Event::TradeExpired { id });
    Ok(freed)
}
