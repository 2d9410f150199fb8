//! Fee configuration and fee skimming.
//!
//! Fees are fixed point: [`PRECISION`](settla_domain::PRECISION) units per
//! percent, capped at 100%. The fee receiver and the global ceiling are
//! configured by the governor; per-swapper fees by a fee setter.

use settla_domain::{Address, Amount, Event, FeeRate, FeeSplit, Role, MAX_PRECISION};
use settla_store::Ledger;

use crate::access;
use crate::error::{FactoryError, FactoryResult};

/// Set the global fee ceiling. Caller must administer FeeSetter.
pub fn set_max_fee(ledger: &mut Ledger, caller: Address, max_fee: u128) -> FactoryResult<FeeRate> {
    access::require(ledger, Role::FeeSetter.admin(), caller)?;
    if max_fee > MAX_PRECISION {
        return Err(FactoryError::FeeExceedsPrecision { fee: max_fee, ceiling: MAX_PRECISION });
    }
    let rate = FeeRate::new(max_fee)?;
    ledger.fees.max_fee = rate;
    ledger.emit(Event::MaxFeeSet { max_fee: rate });
    Ok(rate)
}

/// Set the fee receiver. Caller must administer FeeSetter.
pub fn set_fee_receiver(ledger: &mut Ledger, caller: Address, receiver: Address) -> FactoryResult<()> {
    access::require(ledger, Role::FeeSetter.admin(), caller)?;
    if receiver.is_zero() {
        return Err(FactoryError::ZeroAddress);
    }
    ledger.fees.fee_receiver = receiver;
    ledger.emit(Event::FeeReceiverSet { receiver });
    Ok(())
}

/// Set one swapper's fee. Caller must hold FeeSetter.
pub fn set_swapper_fee(
    ledger: &mut Ledger,
    caller: Address,
    swapper: Address,
    fee: u128,
) -> FactoryResult<FeeRate> {
    access::require(ledger, Role::FeeSetter, caller)?;
    if ledger.swappers.get(swapper).is_none() {
        return Err(FactoryError::UnknownSwapper(swapper));
    }
    let max_fee = ledger.fees.max_fee.units();
    if fee > max_fee {
        return Err(FactoryError::FeeExceedsMax { fee, max_fee });
    }
    let rate = FeeRate::new(fee)?;
    ledger.fees.set_swapper_fee(swapper, rate);
    ledger.emit(Event::SwapperFeeSet { swapper, fee: rate });
    Ok(rate)
}

/// Skim the swapper's fee off `gross` held by the executor.
///
/// The fee moves to the fee receiver; the net stays in executor custody for
/// the caller to release.
pub fn process_fees(
    ledger: &mut Ledger,
    swapper: Address,
    token: Address,
    gross: Amount,
) -> FactoryResult<FeeSplit> {
    let split = ledger.fees.swapper_fee(swapper).split(gross);
    if split.fee > 0 {
        let receiver = ledger.fees.fee_receiver;
        if receiver.is_zero() {
            return Err(FactoryError::ZeroAddress);
        }
        let executor = ledger.executor;
        ledger.tokens.transfer(token, executor, receiver, split.fee)?;
    }
    tracing::debug!(%swapper, %token, gross, fee = split.fee, net = split.net, "Fees processed");
    Ok(split)
}
