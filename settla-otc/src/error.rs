//! OTC pool error types.

use settla_domain::{Address, Amount};
use settla_exec::{FactoryError, SwapError};
use settla_store::{StoreError, TransferError};
use thiserror::Error;

/// Errors surfaced by OTC pool operations.
#[derive(Debug, Error)]
pub enum OtcError {
    /// Caller is not the pool's provider (or no provider is set)
    #[error("Not provider: {0}")]
    NotProvider(Address),

    /// Caller is not a registered, active swapper
    #[error("Not swapper: {0}")]
    NotSwapper(Address),

    /// Offered or wanted token is the zero address
    #[error("Tokens zero")]
    TokensZero,

    /// Zero amount
    #[error("Amount zero: {0}")]
    AmountZero(&'static str),

    /// Withdrawal larger than the offer bucket
    #[error("Not enough provided: requested {requested}, available {available}")]
    NotEnoughProvided {
        /// Requested amount
        requested: Amount,
        /// Bucket balance
        available: Amount,
    },

    /// Provider replacement while the desk still holds the current provider's tokens
    #[error("Provider {provider} still has tokens under management")]
    ProviderHasCustody {
        /// Current provider
        provider: Address,
    },

    /// Zero address
    #[error("Zero address")]
    ZeroAddress,

    /// Claim of nothing, or more than the claimable balance
    #[error("Zero claim: requested {requested}, claimable {claimable}")]
    ZeroClaim {
        /// Requested amount
        requested: Amount,
        /// Claimable balance
        claimable: Amount,
    },

    /// Swapper's price changed between computing and settling a take
    #[error("Quote moved: expected {expected}, got {actual}")]
    QuoteMoved {
        /// Quote used to size the take
        expected: Amount,
        /// Quote at settlement
        actual: Amount,
    },

    /// Swapper could not price the pair
    #[error("Pricing failed: {0}")]
    Pricing(#[from] SwapError),

    /// Token custody failure
    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),

    /// Role check or registry failure
    #[error("Factory error: {0}")]
    Factory(#[from] FactoryError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for OTC pool operations.
pub type OtcResult<T> = Result<T, OtcError>;
