//! OTC pool facade.
//!
//! Wraps desk and netting operations in store transactions and prices
//! takes through the installed swapper adapters.

use std::sync::Arc;
use tracing::{info, warn};

use settla_domain::{Address, Amount, SwapperRef};
use settla_exec::{registry, SwapperSet};
use settla_store::Store;

use crate::desk;
use crate::error::{OtcError, OtcResult};
use crate::tradeable::{self, Take};

fn observe<T>(operation: &'static str, caller: Address, result: OtcResult<T>) -> OtcResult<T> {
    if let Err(e) = &result {
        warn!(operation, %caller, error = %e, "OTC operation rejected");
    }
    result
}

/// OTC pool over the shared store
pub struct OtcPool<S: Store> {
    store: Arc<S>,
    swappers: Arc<SwapperSet>,
}

impl<S: Store> OtcPool<S> {
    /// Create a pool over a store and the trade factory's adapter set
    pub fn new(store: Arc<S>, swappers: Arc<SwapperSet>) -> Self {
        Self { store, swappers }
    }

    /// Replace the provider. Caller must hold Governor.
    pub fn set_provider(&self, caller: Address, provider: Address) -> OtcResult<()> {
        let result = self.store.transact(|ledger| desk::set_provider(ledger, caller, provider));
        if result.is_ok() {
            info!(%provider, "OTC provider set");
        }
        observe("set_provider", caller, result)
    }

    /// Deposit provider inventory
    pub fn deposit(&self, caller: Address, offered: Address, wanted: Address, amount: Amount) -> OtcResult<()> {
        let result = self
            .store
            .transact(|ledger| desk::deposit(ledger, caller, offered, wanted, amount));
        if result.is_ok() {
            info!(%offered, %wanted, amount, "OTC deposit");
        }
        observe("deposit", caller, result)
    }

    /// Withdraw provider inventory
    pub fn withdraw(&self, caller: Address, offered: Address, wanted: Address, amount: Amount) -> OtcResult<()> {
        let result = self
            .store
            .transact(|ledger| desk::withdraw(ledger, caller, offered, wanted, amount));
        if result.is_ok() {
            info!(%offered, %wanted, amount, "OTC withdrawal");
        }
        observe("withdraw", caller, result)
    }

    /// Claim acquired tokens
    pub fn claim(&self, caller: Address, token: Address, amount: Amount) -> OtcResult<()> {
        let result = self.store.transact(|ledger| desk::claim(ledger, caller, token, amount));
        if result.is_ok() {
            info!(%token, amount, "OTC claim");
        }
        observe("claim", caller, result)
    }

    /// Size a take for a swapper without touching state
    pub fn get_max_takeable_from_pool_and_swapper(
        &self,
        swapper: &SwapperRef,
        offered_by_swapper: Address,
        wanted_by_swapper: Address,
        offered_amount: Amount,
    ) -> OtcResult<Take> {
        let swappers = &self.swappers;
        self.store.read(|ledger| {
            let address = registry::resolve_valid(ledger, swapper)?;
            let pricing = swappers.get(address)?;
            tradeable::get_max_takeable_from_pool_and_swapper(
                ledger,
                pricing.as_ref(),
                offered_by_swapper,
                wanted_by_swapper,
                offered_amount,
            )
        })?
    }

    /// Net part of the calling swapper's exchange against the desk
    pub fn take_offer(
        &self,
        caller: Address,
        offered_by_swapper: Address,
        wanted_by_swapper: Address,
        amount: Amount,
    ) -> OtcResult<Take> {
        let pricing = self.swappers.get(caller).map_err(|_| OtcError::NotSwapper(caller));
        let result = pricing.and_then(|pricing| {
            self.store.transact(|ledger| {
                tradeable::take_offer(
                    ledger,
                    pricing.as_ref(),
                    caller,
                    offered_by_swapper,
                    wanted_by_swapper,
                    amount,
                )
            })
        });
        if let Ok(take) = &result {
            if !take.is_empty() {
                info!(
                    swapper = %caller,
                    took_from_pool = take.took_from_pool,
                    took_from_swapper = take.took_from_swapper,
                    "OTC offer taken"
                );
            }
        }
        observe("take_offer", caller, result)
    }

    /// Current provider (zero if unset)
    pub fn provider(&self) -> OtcResult<Address> {
        Ok(self.store.read(|ledger| ledger.otc.provider)?)
    }

    /// Inventory offered for `wanted`
    pub fn available_for(&self, offered: Address, wanted: Address) -> OtcResult<Amount> {
        Ok(self.store.read(|ledger| ledger.otc.available_for(offered, wanted))?)
    }

    /// Desk custody of a token attributable to the provider
    pub fn tokens_under_management(&self, token: Address) -> OtcResult<Amount> {
        Ok(self.store.read(|ledger| ledger.otc.tokens_under_management(token))?)
    }

    /// Claimable balance of a token
    pub fn swapped_available(&self, token: Address) -> OtcResult<Amount> {
        Ok(self.store.read(|ledger| ledger.otc.swapped_available(token))?)
    }
}
