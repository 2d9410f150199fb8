//! Trade factory facade.
//!
//! Wraps every operation in one store transaction, so a rejected call leaves
//! no partial effect and no signal. Reads go straight to the committed ledger;
//! signals and settled trades are read from the store's history.

use std::sync::Arc;
use tracing::{info, warn};

use settla_domain::{
    Address, Amount, Clock, FeeRate, PendingTrade, Role, Swapper, SwapperKind, SwapperRef, TradeId,
    TradeState,
};
use settla_store::{Ledger, Store, StoredEvent};

use crate::error::FactoryResult;
use crate::executor::{self, Execution};
use crate::ports::{FillData, SwapperPort, SwapperSet};
use crate::positions::{self, CreateTrade};
use crate::registry::{self, NameLookup};
use crate::{access, fees};

/// Log the outcome of an operation and pass it through
fn observe<T>(operation: &'static str, caller: Address, result: FactoryResult<T>) -> FactoryResult<T> {
    if let Err(e) = &result {
        warn!(operation, %caller, error = %e, "Operation rejected");
    }
    result
}

/// Trade factory: access control, swapper registry, fees, positions and
/// execution over a shared store.
pub struct TradeFactory<S: Store> {
    store: Arc<S>,
    swappers: Arc<SwapperSet>,
    clock: Arc<dyn Clock>,
}

impl<S: Store> TradeFactory<S> {
    /// Create a factory over a store, an adapter set and a clock
    pub fn new(store: Arc<S>, swappers: Arc<SwapperSet>, clock: Arc<dyn Clock>) -> Self {
        Self { store, swappers, clock }
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Installed swapper adapters
    pub fn adapters(&self) -> &Arc<SwapperSet> {
        &self.swappers
    }

    fn read<T>(&self, query: impl FnOnce(&Ledger) -> T) -> FactoryResult<T> {
        Ok(self.store.read(query)?)
    }

    // =========================================================================
    // Access control
    // =========================================================================

    /// Install the first governor and the fee receiver
    pub fn initialize(&self, governor: Address, fee_receiver: Address) -> FactoryResult<()> {
        let result = self.store.transact(|ledger| {
            access::initialize(ledger, governor)?;
            fees::set_fee_receiver(ledger, governor, fee_receiver)
        });
        if result.is_ok() {
            info!(%governor, %fee_receiver, "Trade factory initialized");
        }
        observe("initialize", governor, result)
    }

    /// Grant a role. Caller must hold the role's admin.
    pub fn grant_role(&self, caller: Address, role: Role, principal: Address) -> FactoryResult<bool> {
        let result = self.store.transact(|ledger| access::grant(ledger, caller, role, principal));
        if let Ok(true) = result {
            info!(%role, %principal, %caller, "Role granted");
        }
        observe("grant_role", caller, result)
    }

    /// Revoke a role. Caller must hold the role's admin.
    pub fn revoke_role(&self, caller: Address, role: Role, principal: Address) -> FactoryResult<bool> {
        let result = self.store.transact(|ledger| access::revoke(ledger, caller, role, principal));
        if let Ok(true) = result {
            info!(%role, %principal, %caller, "Role revoked");
        }
        observe("revoke_role", caller, result)
    }

    /// Renounce a role held by the caller
    pub fn renounce_role(&self, caller: Address, role: Role) -> FactoryResult<bool> {
        let result = self.store.transact(|ledger| access::renounce(ledger, caller, role));
        observe("renounce_role", caller, result)
    }

    /// Membership check
    pub fn has_role(&self, role: Role, principal: Address) -> FactoryResult<bool> {
        self.read(|ledger| access::has_role(ledger, role, principal))
    }

    /// Admin role of a role
    pub fn role_admin(&self, role: Role) -> Role {
        role.admin()
    }

    /// Holders of a role
    pub fn role_members(&self, role: Role) -> FactoryResult<Vec<Address>> {
        self.read(|ledger| ledger.roles.members(role))
    }

    // =========================================================================
    // Swapper registry
    // =========================================================================

    /// Install the code behind a swapper address (no registry effect)
    pub fn install_adapter(&self, adapter: Arc<dyn SwapperPort>) {
        info!(swapper = %adapter.address(), kind = ?adapter.kind(), "Swapper adapter installed");
        self.swappers.install(adapter);
    }

    /// Register a swapper. Caller must hold SwapperAdder.
    pub fn add_swapper(
        &self,
        caller: Address,
        address: Address,
        name: Option<String>,
        kind: SwapperKind,
    ) -> FactoryResult<()> {
        let now = self.clock.now();
        let result = self
            .store
            .transact(|ledger| registry::add(ledger, caller, address, name.clone(), kind, now));
        if result.is_ok() {
            info!(swapper = %address, name = ?name, ?kind, "Swapper added");
        }
        observe("add_swapper", caller, result)
    }

    /// Deprecate a swapper. Caller must hold SwapperAdder or Governor.
    pub fn deprecate_swapper(&self, caller: Address, address: Address) -> FactoryResult<()> {
        let result = self.store.transact(|ledger| registry::deprecate(ledger, caller, address));
        if result.is_ok() {
            info!(swapper = %address, "Swapper deprecated");
        }
        observe("deprecate_swapper", caller, result)
    }

    /// Registered and active
    pub fn is_valid_swapper(&self, address: Address) -> FactoryResult<bool> {
        self.read(|ledger| registry::is_valid(ledger, address))
    }

    /// Lookup by name
    pub fn is_valid_swapper_name(&self, name: &str) -> FactoryResult<NameLookup> {
        self.read(|ledger| registry::is_valid_name(ledger, name))
    }

    /// Registry record
    pub fn swapper(&self, address: Address) -> FactoryResult<Option<Swapper>> {
        self.read(|ledger| ledger.swappers.get(address).cloned())
    }

    /// Registry record by registered name
    pub fn swapper_by_name(&self, name: &str) -> FactoryResult<Option<Swapper>> {
        self.read(|ledger| ledger.swappers.by_name(name).cloned())
    }

    /// Every registry record
    pub fn swappers(&self) -> FactoryResult<Vec<Swapper>> {
        self.read(|ledger| ledger.swappers.all())
    }

    /// Assign a strategy's default swapper. Caller must hold SwapperSetter.
    pub fn set_strategy_swapper(
        &self,
        caller: Address,
        strategy: Address,
        swapper: &SwapperRef,
    ) -> FactoryResult<Address> {
        let result = self
            .store
            .transact(|ledger| registry::set_strategy_swapper(ledger, caller, strategy, swapper));
        if let Ok(address) = &result {
            info!(%strategy, swapper = %address, "Strategy swapper set");
        }
        observe("set_strategy_swapper", caller, result)
    }

    /// Default swapper of a strategy
    pub fn strategy_swapper(&self, strategy: Address) -> FactoryResult<Option<Address>> {
        self.read(|ledger| ledger.swappers.assigned(strategy))
    }

    /// Pre-authorize a swapper for a token. Caller must hold SwapperSetter.
    pub fn enable_swapper_token(&self, caller: Address, swapper: Address, token: Address) -> FactoryResult<()> {
        let result = self
            .store
            .transact(|ledger| executor::enable_swapper_token(ledger, caller, swapper, token));
        observe("enable_swapper_token", caller, result)
    }

    /// Tokens the executor authorized for a swapper
    pub fn approved_tokens(&self, swapper: Address) -> FactoryResult<Vec<Address>> {
        self.read(|ledger| ledger.swappers.approved_tokens(swapper))
    }

    // =========================================================================
    // Fees
    // =========================================================================

    /// Set the global fee ceiling. Caller must hold Governor.
    pub fn set_max_fee(&self, caller: Address, max_fee: u128) -> FactoryResult<FeeRate> {
        let result = self.store.transact(|ledger| fees::set_max_fee(ledger, caller, max_fee));
        if let Ok(rate) = &result {
            info!(max_fee = %rate, "Max fee set");
        }
        observe("set_max_fee", caller, result)
    }

    /// Set the fee receiver. Caller must hold Governor.
    pub fn set_fee_receiver(&self, caller: Address, receiver: Address) -> FactoryResult<()> {
        let result = self.store.transact(|ledger| fees::set_fee_receiver(ledger, caller, receiver));
        if result.is_ok() {
            info!(%receiver, "Fee receiver set");
        }
        observe("set_fee_receiver", caller, result)
    }

    /// Set one swapper's fee. Caller must hold FeeSetter.
    pub fn set_swapper_fee(&self, caller: Address, swapper: Address, fee: u128) -> FactoryResult<FeeRate> {
        let result = self.store.transact(|ledger| fees::set_swapper_fee(ledger, caller, swapper, fee));
        if let Ok(rate) = &result {
            info!(%swapper, fee = %rate, "Swapper fee set");
        }
        observe("set_swapper_fee", caller, result)
    }

    /// Global fee ceiling
    pub fn max_fee(&self) -> FactoryResult<FeeRate> {
        self.read(|ledger| ledger.fees.max_fee)
    }

    /// Fee receiver
    pub fn fee_receiver(&self) -> FactoryResult<Address> {
        self.read(|ledger| ledger.fees.fee_receiver)
    }

    /// Fee of a swapper
    pub fn swapper_fee(&self, swapper: Address) -> FactoryResult<FeeRate> {
        self.read(|ledger| ledger.fees.swapper_fee(swapper))
    }

    // =========================================================================
    // Positions
    // =========================================================================

    /// Create a pending trade owned by the caller
    pub fn create(&self, caller: Address, request: &CreateTrade) -> FactoryResult<TradeId> {
        let now = self.clock.now();
        let result = self.store.transact(|ledger| positions::create(ledger, caller, request, now));
        if let Ok(id) = &result {
            info!(
                id,
                strategy = %caller,
                token_in = %request.token_in,
                token_out = %request.token_out,
                amount_in = request.amount_in,
                "Trade created"
            );
        }
        observe("create", caller, result)
    }

    /// Cancel one of the caller's pending trades
    pub fn cancel_pending(&self, caller: Address, id: TradeId) -> FactoryResult<()> {
        let result = self.store.transact(|ledger| positions::cancel_pending(ledger, caller, id));
        if result.is_ok() {
            info!(id, strategy = %caller, "Trade cancelled");
        }
        observe("cancel_pending", caller, result)
    }

    /// Cancel every pending trade of the caller
    pub fn cancel_all_pending(&self, caller: Address) -> FactoryResult<Vec<TradeId>> {
        let result = self.store.transact(|ledger| positions::cancel_all_pending(ledger, caller));
        if let Ok(ids) = &result {
            info!(strategy = %caller, count = ids.len(), "Trades cancelled");
        }
        observe("cancel_all_pending", caller, result)
    }

    /// Move a strategy's pending trades to another swapper.
    /// Caller must hold SwapperSetter.
    pub fn change_strategy_pending_trades_swapper(
        &self,
        caller: Address,
        strategy: Address,
        swapper: &SwapperRef,
    ) -> FactoryResult<Vec<TradeId>> {
        let result = self.store.transact(|ledger| {
            positions::change_strategy_pending_trades_swapper(ledger, caller, strategy, swapper)
        });
        if let Ok(ids) = &result {
            info!(%strategy, count = ids.len(), "Pending trades moved to new swapper");
        }
        observe("change_strategy_pending_trades_swapper", caller, result)
    }

    /// Pending trade by id
    pub fn pending_trade(&self, id: TradeId) -> FactoryResult<Option<PendingTrade>> {
        self.read(|ledger| ledger.trades.pending(id).cloned())
    }

    /// Every pending id
    pub fn pending_trades(&self) -> FactoryResult<Vec<TradeId>> {
        self.read(|ledger| ledger.trades.pending_ids())
    }

    /// Pending ids of a strategy
    pub fn pending_trades_by_strategy(&self, strategy: Address) -> FactoryResult<Vec<TradeId>> {
        self.read(|ledger| ledger.trades.pending_ids_by_strategy(strategy))
    }

    /// Lifecycle state of any trade ever created
    pub fn trade_state(&self, id: TradeId) -> FactoryResult<Option<TradeState>> {
        if self.read(|ledger| ledger.trades.pending(id).is_some())? {
            return Ok(Some(TradeState::Pending));
        }
        Ok(self.store.history(|history| history.settled(id).map(|r| r.state))?)
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Settle a pending trade. Caller must hold Mechanic.
    pub fn execute(&self, caller: Address, id: TradeId, fill_data: Option<FillData>) -> FactoryResult<Execution> {
        let now = self.clock.now();
        let swappers = &self.swappers;
        let result = self
            .store
            .transact(|ledger| executor::execute(ledger, swappers, caller, id, fill_data, now));
        if let Ok(execution) = &result {
            info!(
                id,
                gross = execution.gross,
                fee = execution.fee,
                received = execution.received,
                "Trade executed"
            );
        }
        observe("execute", caller, result)
    }

    /// Retire an expired trade. Caller must hold Mechanic.
    pub fn expire(&self, caller: Address, id: TradeId) -> FactoryResult<Amount> {
        let now = self.clock.now();
        let result = self.store.transact(|ledger| executor::expire(ledger, caller, id, now));
        if let Ok(freed) = &result {
            info!(id, freed, "Trade expired");
        }
        observe("expire", caller, result)
    }

    // =========================================================================
    // Signals
    // =========================================================================

    /// Committed events after a sequence number
    pub fn events_after(&self, seq: i64) -> FactoryResult<Vec<StoredEvent>> {
        Ok(self.store.history(|history| history.events_after(seq))?)
    }

    /// Committed events touching a trade
    pub fn trade_events(&self, id: TradeId) -> FactoryResult<Vec<StoredEvent>> {
        Ok(self.store.history(|history| history.trade_events(id))?)
    }
}
