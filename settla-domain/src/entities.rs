//! Domain Entities for Settla
//!
//! Roles, swappers and the pending-trade lifecycle.

use crate::value_objects::{Address, Amount, Slippage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a pending trade. Starts at 1, never reused.
pub type TradeId = u64;

// =============================================================================
// Role
// =============================================================================

/// Capability a principal may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Owner of registries and configuration; administers every role
    Governor,
    /// Administers the `Strategy` role
    StrategyAdmin,
    /// May create and cancel its own trades
    Strategy,
    /// May register and deprecate swappers
    SwapperAdder,
    /// May assign swappers to strategies and their pending trades
    SwapperSetter,
    /// May execute or expire pending trades
    Mechanic,
    /// May configure per-swapper fees
    FeeSetter,
}

impl Role {
    /// All roles, in declaration order
    pub const ALL: [Role; 7] = [
        Role::Governor,
        Role::StrategyAdmin,
        Role::Strategy,
        Role::SwapperAdder,
        Role::SwapperSetter,
        Role::Mechanic,
        Role::FeeSetter,
    ];

    /// Role allowed to grant and revoke this role
    pub fn admin(&self) -> Role {
        match self {
            Role::Strategy => Role::StrategyAdmin,
            _ => Role::Governor,
        }
    }

    /// Stable name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Role::Governor => "governor",
            Role::StrategyAdmin => "strategy_admin",
            Role::Strategy => "strategy",
            Role::SwapperAdder => "swapper_adder",
            Role::SwapperSetter => "swapper_setter",
            Role::Mechanic => "mechanic",
            Role::FeeSetter => "fee_setter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Swapper
// =============================================================================

/// How a swapper receives its settlement data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapperKind {
    /// Prices and fills in a single call
    Sync,
    /// Fills from data quoted off-chain and supplied at execution
    Async,
}

/// Registry status. Deprecation is permanent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapperStatus {
    /// Eligible for new and continuing trades
    Active,
    /// Excluded from every future settlement
    Deprecated,
}

/// Registered execution agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swapper {
    /// Swapper address
    pub address: Address,
    /// Optional unique, immutable name
    pub name: Option<String>,
    /// Settlement data mode
    pub kind: SwapperKind,
    /// Registry status
    pub status: SwapperStatus,
    /// When the swapper was registered
    pub added_at: DateTime<Utc>,
}

impl Swapper {
    /// Create a new active swapper record
    pub fn new(
        address: Address,
        name: Option<String>,
        kind: SwapperKind,
        added_at: DateTime<Utc>,
    ) -> Self {
        Self { address, name, kind, status: SwapperStatus::Active, added_at }
    }

    /// Check if the swapper may settle trades
    pub fn is_active(&self) -> bool {
        matches!(self.status, SwapperStatus::Active)
    }
}

/// How a caller designates a swapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum SwapperRef {
    /// Whatever swapper is assigned to the calling strategy
    Assigned,
    /// A swapper by address
    Address(Address),
    /// A swapper by registered name
    Name(String),
}

impl From<Address> for SwapperRef {
    fn from(address: Address) -> Self {
        SwapperRef::Address(address)
    }
}

impl From<&str> for SwapperRef {
    fn from(name: &str) -> Self {
        SwapperRef::Name(name.to_string())
    }
}

// =============================================================================
// Pending Trade
// =============================================================================

/// A created-but-not-yet-settled swap intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTrade {
    /// Trade identifier
    pub id: TradeId,
    /// Owning strategy; receives the proceeds
    pub strategy: Address,
    /// Assigned swapper
    pub swapper: Address,
    /// Asset given up
    pub token_in: Address,
    /// Asset received
    pub token_out: Address,
    /// Amount of `token_in` to settle
    pub amount_in: Amount,
    /// Slippage bound forwarded to the swapper
    pub max_slippage: Slippage,
    /// Absolute deadline; settlement is allowed while `now <= deadline`
    pub deadline: DateTime<Utc>,
    /// When the trade was created
    pub created_at: DateTime<Utc>,
}

impl PendingTrade {
    /// Check if the trade is past its deadline
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }
}

/// How a trade left the pending set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Settlement {
    /// Settled through its swapper
    Executed {
        /// Net amount credited to the strategy
        received: Amount,
        /// Fee skimmed to the fee receiver
        fee: Amount,
    },
    /// Expired by a mechanic
    Expired {
        /// Allowance freed back to the strategy
        freed: Amount,
    },
    /// Cancelled by its strategy
    Cancelled,
}

/// Trade lifecycle with an explicit terminal marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TradeState {
    /// Awaiting execution, expiry or cancellation
    Pending,
    /// Terminal; the id will never be pending again
    Settled(Settlement),
}

impl TradeState {
    /// Get the name of the state for display
    pub fn name(&self) -> &'static str {
        match self {
            TradeState::Pending => "pending",
            TradeState::Settled(Settlement::Executed { .. }) => "executed",
            TradeState::Settled(Settlement::Expired { .. }) => "expired",
            TradeState::Settled(Settlement::Cancelled) => "cancelled",
        }
    }
}

/// Stored trade: fields plus lifecycle state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Trade fields as created (swapper may have been reassigned)
    pub trade: PendingTrade,
    /// Lifecycle state
    pub state: TradeState,
}

impl TradeRecord {
    /// Check if the trade is still pending
    pub fn is_pending(&self) -> bool {
        matches!(self.state, TradeState::Pending)
    }
}

// =============================================================================
// Tests
// =============================================================================
