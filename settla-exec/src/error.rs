//! Trade factory error types.
//!
//! One variant per reason code. Every error is returned before any state is
//! committed; the store discards the working copy.

use settla_domain::{Address, Amount, DomainError, Role, SwapperKind, TradeId};
use settla_store::{StoreError, TransferError};
use thiserror::Error;

/// Errors surfaced by trade factory operations.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Caller lacks the role the operation requires
    #[error("Unauthorized: {principal} lacks role {role}")]
    Unauthorized {
        /// Required role
        role: Role,
        /// Caller
        principal: Address,
    },

    /// Factory already has a governor
    #[error("Trade factory already initialized")]
    AlreadyInitialized,

    /// Swapper address or name already registered
    #[error("Duplicate swapper: {0}")]
    DuplicateSwapper(String),

    /// Zero swapper address, empty name, or a swapper that is not active
    #[error("Invalid swapper: {0}")]
    InvalidSwapper(String),

    /// Swapper not present in the registry
    #[error("Unknown swapper: {0}")]
    UnknownSwapper(Address),

    /// Assigned swapper was deprecated after the trade was created
    #[error("Deprecated swapper: {0}")]
    DeprecatedSwapper(Address),

    /// Fee above the fixed-point ceiling
    #[error("Fee {fee} exceeds precision ceiling {ceiling}")]
    FeeExceedsPrecision {
        /// Requested fee
        fee: u128,
        /// Ceiling (100%)
        ceiling: u128,
    },

    /// Fee above the configured maximum
    #[error("Fee {fee} exceeds max fee {max_fee}")]
    FeeExceedsMax {
        /// Requested fee
        fee: u128,
        /// Configured maximum
        max_fee: u128,
    },

    /// Zero address where a token or recipient is required
    #[error("Zero address")]
    ZeroAddress,

    /// Zero amount
    #[error("Zero amount")]
    ZeroAmount,

    /// Zero slippage bound
    #[error("Zero slippage")]
    ZeroSlippage,

    /// Deadline not in the future
    #[error("Deadline too soon")]
    DeadlineTooSoon,

    /// Calling strategy has no assigned or valid swapper
    #[error("No swapper for strategy {0}")]
    NoStrategySwapper(Address),

    /// Trade id is not pending (never created, or already settled)
    #[error("Trade not pending: {0}")]
    TradeNotPending(TradeId),

    /// Caller is not the strategy owning the trade
    #[error("Trade {id} is not owned by {caller}")]
    NotTradeOwner {
        /// Trade
        id: TradeId,
        /// Caller
        caller: Address,
    },

    /// Trade deadline has passed
    #[error("Trade expired: {0}")]
    TradeExpired(TradeId),

    /// Trade deadline has not passed yet
    #[error("Trade not expired: {0}")]
    TradeNotExpired(TradeId),

    /// Strategy has nothing pending
    #[error("No trades pending from strategy {0}")]
    NoTradesPendingFromStrategy(Address),

    /// Token custody failure (balance or allowance)
    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),

    /// Swapper capability failure
    #[error("Swap failed: {0}")]
    Swap(#[from] SwapError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

/// Result type for trade factory operations.
pub type FactoryResult<T> = Result<T, FactoryError>;

/// Errors raised by a swapper while quoting or filling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapError {
    /// Registered swapper has no installed adapter
    #[error("No adapter installed for swapper {0}")]
    NoAdapter(Address),

    /// Async swapper invoked without fill data
    #[error("Missing external fill data")]
    MissingFillData,

    /// Fill data could not be decoded
    #[error("Invalid fill data: {0}")]
    InvalidFillData(String),

    /// Output fell outside the slippage bound
    #[error("Slippage exceeded: expected at least {min_out}, got {amount_out}")]
    SlippageExceeded {
        /// Smallest acceptable output
        min_out: Amount,
        /// Actual output
        amount_out: Amount,
    },

    /// Venue cannot price the pair
    #[error("Unsupported pair {token_in} -> {token_out}")]
    UnsupportedPair {
        /// Input token
        token_in: Address,
        /// Output token
        token_out: Address,
    },

    /// Swapper reported more output than it delivered
    #[error("Swapper delivered {delivered} but reported {reported}")]
    Underdelivered {
        /// Balance increase observed
        delivered: Amount,
        /// Amount the swapper returned
        reported: Amount,
    },

    /// Custody failure inside the swapper
    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),

    /// Swapper did not pull the whole input
    #[error("Swapper left {left} of the input unconsumed")]
    InputNotConsumed {
        /// Input still in executor custody
        left: Amount,
    },

    /// Installed adapter settles differently than the registry says
    #[error("Swapper {swapper} registered as {registered:?} but adapter is {installed:?}")]
    KindMismatch {
        /// Swapper address
        swapper: Address,
        /// Kind in the registry
        registered: SwapperKind,
        /// Kind of the installed adapter
        installed: SwapperKind,
    },

    /// Venue-specific failure
    #[error("Venue error: {0}")]
    Venue(String),
}
