//! Call journal replay.
//!
//! A journal is JSON lines, one [`Call`] per line. Calls are applied in
//! order against a fresh factory and pool; a rejected call is logged and
//! counted, and the replay moves on. Time only moves when a call carries
//! an `at` timestamp, so a journal replays identically every time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use settla_domain::{Address, Amount, Clock, ManualClock, Role, SwapperKind, SwapperRef, TradeId};
use settla_exec::{CreateTrade, FactoryError, FillData, QuotedSwapper, StubSwapper, SwapperSet, TradeFactory};
use settla_otc::{OtcPool, OtcSwapper};
use settla_store::{Ledger, MemoryStore, Store, StoredEvent};

use crate::config::Config;
use crate::error::{DaemonError, DaemonResult};

// =============================================================================
// Journal format
// =============================================================================

/// One journal line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// Principal issuing the call
    pub caller: Address,
    /// Clock value for this call (clock unchanged if absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,
    /// Operation
    pub op: Operation,
}

/// Operations a journal can issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    // Seeding (unrestricted)
    /// Mint tokens to a holder
    Mint { token: Address, to: Address, amount: Amount },
    /// Set the caller's allowance to a spender
    Approve { token: Address, spender: Address, amount: Amount },
    /// Install a fixed-rate swapper adapter
    DeployStub { address: Address, rate: Decimal },
    /// Install an off-chain-quoted swapper adapter
    DeployQuoted { address: Address },
    /// Install an OTC-netting swapper in front of an installed market
    DeployOtc { address: Address, market: Address },

    // Access control
    /// Grant a role
    GrantRole { role: Role, principal: Address },
    /// Revoke a role
    RevokeRole { role: Role, principal: Address },
    /// Renounce a role held by the caller
    RenounceRole { role: Role },

    // Registry
    /// Register a swapper
    AddSwapper { address: Address, name: Option<String>, kind: SwapperKind },
    /// Deprecate a swapper
    DeprecateSwapper { address: Address },
    /// Assign a strategy's default swapper
    SetStrategySwapper { strategy: Address, swapper: SwapperRef },
    /// Pre-authorize a swapper for a token
    EnableSwapperToken { swapper: Address, token: Address },

    // Fees
    /// Set the global fee ceiling
    SetMaxFee { fee: u128 },
    /// Set the fee receiver
    SetFeeReceiver { receiver: Address },
    /// Set a swapper's fee
    SetSwapperFee { swapper: Address, fee: u128 },

    // Positions and execution
    /// Create a pending trade
    Create(CreateTrade),
    /// Cancel one pending trade
    CancelPending { id: TradeId },
    /// Cancel every pending trade of the caller
    CancelAllPending,
    /// Move a strategy's pending trades to another swapper
    ChangeStrategyPendingTradesSwapper { strategy: Address, swapper: SwapperRef },
    /// Execute a pending trade
    Execute {
        id: TradeId,
        #[serde(default)]
        fill_data: Option<FillData>,
    },
    /// Expire a pending trade
    Expire { id: TradeId },

    // OTC pool
    /// Replace the OTC provider
    SetProvider { provider: Address },
    /// Deposit provider inventory
    Deposit { offered: Address, wanted: Address, amount: Amount },
    /// Withdraw provider inventory
    Withdraw { offered: Address, wanted: Address, amount: Amount },
    /// Claim acquired tokens
    Claim { token: Address, amount: Amount },
    /// Net against the desk as the calling swapper
    TakeOffer { offered: Address, wanted: Address, amount: Amount },
}

impl Operation {
    /// Stable name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Mint { .. } => "mint",
            Operation::Approve { .. } => "approve",
            Operation::DeployStub { .. } => "deploy_stub",
            Operation::DeployQuoted { .. } => "deploy_quoted",
            Operation::DeployOtc { .. } => "deploy_otc",
            Operation::GrantRole { .. } => "grant_role",
            Operation::RevokeRole { .. } => "revoke_role",
            Operation::RenounceRole { .. } => "renounce_role",
            Operation::AddSwapper { .. } => "add_swapper",
            Operation::DeprecateSwapper { .. } => "deprecate_swapper",
            Operation::SetStrategySwapper { .. } => "set_strategy_swapper",
            Operation::EnableSwapperToken { .. } => "enable_swapper_token",
            Operation::SetMaxFee { .. } => "set_max_fee",
            Operation::SetFeeReceiver { .. } => "set_fee_receiver",
            Operation::SetSwapperFee { .. } => "set_swapper_fee",
            Operation::Create(_) => "create",
            Operation::CancelPending { .. } => "cancel_pending",
            Operation::CancelAllPending => "cancel_all_pending",
            Operation::ChangeStrategyPendingTradesSwapper { .. } => {
                "change_strategy_pending_trades_swapper"
            },
            Operation::Execute { .. } => "execute",
            Operation::Expire { .. } => "expire",
            Operation::SetProvider { .. } => "set_provider",
            Operation::Deposit { .. } => "deposit",
            Operation::Withdraw { .. } => "withdraw",
            Operation::Claim { .. } => "claim",
            Operation::TakeOffer { .. } => "take_offer",
        }
    }
}

/// Clock value a journal starts at: the first `at` it carries, or the Unix
/// epoch if it carries none. Lines that do not parse are skipped here;
/// [`Replayer::replay`] reports them.
pub fn start_time(journal: &str) -> DateTime<Utc> {
    journal
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| serde_json::from_str::<Call>(line).ok())
        .find_map(|call| call.at)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

// =============================================================================
// Replayer
// =============================================================================

/// Counters for one replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaySummary {
    /// Calls that committed
    pub applied: usize,
    /// Calls that were rejected
    pub rejected: usize,
}

/// Factory and pool wired to one in-memory store
pub struct Replayer {
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
    swappers: Arc<SwapperSet>,
    factory: TradeFactory<MemoryStore>,
    pool: OtcPool<MemoryStore>,
}

impl Replayer {
    /// Build a fresh system from configuration, with the clock at `start`
    pub fn new(config: &Config, start: DateTime<Utc>) -> DaemonResult<Self> {
        let executor = Address::from_low_u64(0xe0);
        let desk = Address::from_low_u64(0xd0);
        let store = Arc::new(MemoryStore::new(Ledger::new(executor, desk)));
        let clock = Arc::new(ManualClock::new(start));
        let swappers = Arc::new(SwapperSet::new());
        let factory = TradeFactory::new(store.clone(), swappers.clone(), clock.clone());
        let pool = OtcPool::new(store.clone(), swappers.clone());

        let governance = &config.governance;
        factory.initialize(governance.governor, governance.fee_receiver)?;
        if !governance.max_fee.is_zero() {
            factory.set_max_fee(governance.governor, governance.max_fee.units())?;
        }
        if let Some(provider) = config.otc_provider {
            pool.set_provider(governance.governor, provider)?;
        }

        Ok(Self { store, clock, swappers, factory, pool })
    }

    /// Trade factory
    pub fn factory(&self) -> &TradeFactory<MemoryStore> {
        &self.factory
    }

    /// OTC pool
    pub fn pool(&self) -> &OtcPool<MemoryStore> {
        &self.pool
    }

    /// Committed events after a sequence number
    pub fn events_after(&self, seq: i64) -> DaemonResult<Vec<StoredEvent>> {
        Ok(self.factory.events_after(seq)?)
    }

    /// Apply one call
    pub fn apply(&self, call: &Call) -> DaemonResult<()> {
        if let Some(at) = call.at {
            self.clock.set(at);
        }
        let caller = call.caller;
        match &call.op {
            Operation::Mint { token, to, amount } => {
                self.store.transact(|ledger| -> Result<(), FactoryError> {
                    ledger.tokens.mint(*token, *to, *amount)?;
                    Ok(())
                })?;
            },
            Operation::Approve { token, spender, amount } => {
                self.store.transact(|ledger| -> Result<(), FactoryError> {
                    ledger.tokens.approve(*token, caller, *spender, *amount);
                    Ok(())
                })?;
            },
            Operation::DeployStub { address, rate } => {
                self.factory.install_adapter(Arc::new(StubSwapper::new(*address, *rate)));
            },
            Operation::DeployQuoted { address } => {
                self.factory.install_adapter(Arc::new(QuotedSwapper::new(*address)));
            },
            Operation::DeployOtc { address, market } => {
                let market = self.swappers.get(*market).map_err(FactoryError::from)?;
                self.factory.install_adapter(Arc::new(OtcSwapper::new(*address, market)));
            },
            Operation::GrantRole { role, principal } => {
                self.factory.grant_role(caller, *role, *principal)?;
            },
            Operation::RevokeRole { role, principal } => {
                self.factory.revoke_role(caller, *role, *principal)?;
            },
            Operation::RenounceRole { role } => {
                self.factory.renounce_role(caller, *role)?;
            },
            Operation::AddSwapper { address, name, kind } => {
                self.factory.add_swapper(caller, *address, name.clone(), *kind)?;
            },
            Operation::DeprecateSwapper { address } => {
                self.factory.deprecate_swapper(caller, *address)?;
            },
            Operation::SetStrategySwapper { strategy, swapper } => {
                self.factory.set_strategy_swapper(caller, *strategy, swapper)?;
            },
            Operation::EnableSwapperToken { swapper, token } => {
                self.factory.enable_swapper_token(caller, *swapper, *token)?;
            },
            Operation::SetMaxFee { fee } => {
                self.factory.set_max_fee(caller, *fee)?;
            },
            Operation::SetFeeReceiver { receiver } => {
                self.factory.set_fee_receiver(caller, *receiver)?;
            },
            Operation::SetSwapperFee { swapper, fee } => {
                self.factory.set_swapper_fee(caller, *swapper, *fee)?;
            },
            Operation::Create(request) => {
                self.factory.create(caller, request)?;
            },
            Operation::CancelPending { id } => {
                self.factory.cancel_pending(caller, *id)?;
            },
            Operation::CancelAllPending => {
                self.factory.cancel_all_pending(caller)?;
            },
            Operation::ChangeStrategyPendingTradesSwapper { strategy, swapper } => {
                self.factory.change_strategy_pending_trades_swapper(caller, *strategy, swapper)?;
            },
            Operation::Execute { id, fill_data } => {
                self.factory.execute(caller, *id, fill_data.clone())?;
            },
            Operation::Expire { id } => {
                self.factory.expire(caller, *id)?;
            },
            Operation::SetProvider { provider } => {
                self.pool.set_provider(caller, *provider)?;
            },
            Operation::Deposit { offered, wanted, amount } => {
                self.pool.deposit(caller, *offered, *wanted, *amount)?;
            },
            Operation::Withdraw { offered, wanted, amount } => {
                self.pool.withdraw(caller, *offered, *wanted, *amount)?;
            },
            Operation::Claim { token, amount } => {
                self.pool.claim(caller, *token, *amount)?;
            },
            Operation::TakeOffer { offered, wanted, amount } => {
                self.pool.take_offer(caller, *offered, *wanted, *amount)?;
            },
        }
        Ok(())
    }

    /// Replay a whole journal.
    ///
    /// Blank lines and `#` comments are skipped. A line that does not parse
    /// aborts the replay; a call that is rejected does not.
    pub fn replay(&self, journal: &str) -> DaemonResult<ReplaySummary> {
        let mut summary = ReplaySummary::default();
        for (index, line) in journal.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let call: Call = serde_json::from_str(line)
                .map_err(|e| DaemonError::Replay { line: index + 1, message: e.to_string() })?;

            match self.apply(&call) {
                Ok(()) => {
                    debug!(line = index + 1, op = call.op.name(), "Call applied");
                    summary.applied += 1;
                },
                Err(e) => {
                    warn!(line = index + 1, op = call.op.name(), caller = %call.caller, error = %e, "Call rejected");
                    summary.rejected += 1;
                },
            }
        }
        info!(
            applied = summary.applied,
            rejected = summary.rejected,
            at = %self.clock.now(),
            "Journal replayed"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_parses_externally_tagged_ops() {
        let line = r#"{"caller":"0x0000000000000000000000000000000000000001","op":{"mint":{"token":"0x000000000000000000000000000000000000007a","to":"0x0000000000000000000000000000000000000010","amount":340282366920938463463374607431768211455}}}"#;
        let call: Call = serde_json::from_str(line).unwrap();
        assert_eq!(call.caller, Address::from_low_u64(1));
        assert!(matches!(call.op, Operation::Mint { amount: u128::MAX, .. }));
        assert!(call.at.is_none());
    }

    #[test]
    fn test_start_time_is_first_timestamp() {
        let journal = concat!(
            "# seed\n",
            r#"{"caller":"0x0000000000000000000000000000000000000010","op":"cancel_all_pending"}"#,
            "\n",
            r#"{"caller":"0x0000000000000000000000000000000000000010","at":"2020-01-01T00:10:00Z","op":"cancel_all_pending"}"#,
            "\n",
            r#"{"caller":"0x0000000000000000000000000000000000000010","at":"2021-01-01T00:00:00Z","op":"cancel_all_pending"}"#,
            "\n",
        );
        assert_eq!(start_time(journal).to_rfc3339(), "2020-01-01T00:10:00+00:00");
        assert_eq!(start_time("# empty\n"), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_unit_variant_parses() {
        let line = r#"{"caller":"0x0000000000000000000000000000000000000010","op":"cancel_all_pending"}"#;
        let call: Call = serde_json::from_str(line).unwrap();
        assert_eq!(call.op, Operation::CancelAllPending);
        assert_eq!(call.op.name(), "cancel_all_pending");
    }
}
