//! Pending trade lifecycle owned by strategies.
//!
//! Strategies create and cancel their own trades; swapper setters may move a
//! strategy's pending trades to another swapper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use settla_domain::{
    Address, Amount, Event, PendingTrade, Role, Settlement, Slippage, SwapperRef, TradeId,
};
use settla_store::Ledger;

use crate::access;
use crate::error::{FactoryError, FactoryResult};
use crate::registry;

/// Parameters of a new trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTrade {
    /// Swapper to settle through
    pub swapper: SwapperRef,
    /// Asset given up
    pub token_in: Address,
    /// Asset received
    pub token_out: Address,
    /// Amount of `token_in`
    pub amount_in: Amount,
    /// Slippage bound in fixed-point units
    pub max_slippage: u128,
    /// Absolute deadline
    pub deadline: DateTime<Utc>,
}

/// Create a pending trade owned by `caller`. Caller must hold Strategy.
pub fn create(
    ledger: &mut Ledger,
    caller: Address,
    request: &CreateTrade,
    now: DateTime<Utc>,
) -> FactoryResult<TradeId> {
    access::require(ledger, Role::Strategy, caller)?;
    let swapper = registry::resolve(ledger, caller, &request.swapper)?;
    if request.token_in.is_zero() || request.token_out.is_zero() {
        return Err(FactoryError::ZeroAddress);
    }
    if request.amount_in == 0 {
        return Err(FactoryError::ZeroAmount);
    }
    let max_slippage = Slippage::new(request.max_slippage).map_err(|_| FactoryError::ZeroSlippage)?;
    if request.deadline <= now {
        return Err(FactoryError::DeadlineTooSoon);
    }

    let id = ledger.trades.next_id()?;
    let trade = PendingTrade {
        id,
        strategy: caller,
        swapper,
        token_in: request.token_in,
        token_out: request.token_out,
        amount_in: request.amount_in,
        max_slippage,
        deadline: request.deadline,
        created_at: now,
    };
    ledger.trades.insert(trade)?;
    ledger.emit(Event::TradeCreated {
        id,
        strategy: caller,
        swapper,
        token_in: request.token_in,
        token_out: request.token_out,
        amount_in: request.amount_in,
        max_slippage,
        deadline: request.deadline,
    });
    Ok(id)
}

/// Cancel one of the caller's pending trades
pub fn cancel_pending(ledger: &mut Ledger, caller: Address, id: TradeId) -> FactoryResult<()> {
    access::require(ledger, Role::Strategy, caller)?;
    let trade = ledger.trades.pending(id).ok_or(FactoryError::TradeNotPending(id))?;
    if trade.strategy != caller {
        return Err(FactoryError::NotTradeOwner { id, caller });
    }
    ledger.trades.settle(id, Settlement::Cancelled)?;
    ledger.emit(Event::TradeCanceled { id, strategy: caller });
    Ok(())
}

/// Cancel every pending trade of the caller
pub fn cancel_all_pending(ledger: &mut Ledger, caller: Address) -> FactoryResult<Vec<TradeId>> {
    access::require(ledger, Role::Strategy, caller)?;
    let ids = ledger.trades.pending_ids_by_strategy(caller);
    if ids.is_empty() {
        return Err(FactoryError::NoTradesPendingFromStrategy(caller));
    }
    for id in &ids {
        ledger.trades.settle(*id, Settlement::Cancelled)?;
    }
    ledger.emit(Event::TradesCanceled { strategy: caller, ids: ids.clone() });
    Ok(ids)
}

/// Move every pending trade of `strategy` to another swapper.
/// Caller must hold SwapperSetter.
pub fn change_strategy_pending_trades_swapper(
    ledger: &mut Ledger,
    caller: Address,
    strategy: Address,
    swapper: &SwapperRef,
) -> FactoryResult<Vec<TradeId>> {
    access::require(ledger, Role::SwapperSetter, caller)?;
    let swapper = registry::resolve_valid(ledger, swapper)?;
    let ids = ledger.trades.pending_ids_by_strategy(strategy);
    for id in &ids {
        ledger.trades.set_swapper(*id, swapper)?;
    }
    ledger.emit(Event::TradesSwapperChanged { strategy, ids: ids.clone(), swapper });
    Ok(ids)
}
