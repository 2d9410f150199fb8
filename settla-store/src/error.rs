//! Storage layer errors

use settla_domain::{Address, Amount};
use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity (trade, swapper, ...)
        entity_type: String,
        /// Entity ID
        id: String,
    },

    /// Duplicate entity
    #[error("Duplicate entity: {entity_type} with id {id}")]
    Duplicate {
        /// Type of entity
        entity_type: String,
        /// Entity ID
        id: String,
    },

    /// Invalid state transition or counter underflow
    #[error("Invalid state transition: {message}")]
    InvalidState {
        /// Description of the invalid transition
        message: String,
    },

    /// Counter would exceed its integer range
    #[error("Counter overflow: {0}")]
    Overflow(String),

    /// Lock poisoned by a panicking writer
    #[error("Lock error: {0}")]
    Lock(String),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Create a duplicate error
    pub fn duplicate(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState { message: message.into() }
    }
}

/// Token custody failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// Holder does not own enough of the token
    #[error("Insufficient balance of {token} for {holder}: needed {needed}, available {available}")]
    InsufficientBalance {
        /// Token
        token: Address,
        /// Debited holder
        holder: Address,
        /// Requested amount
        needed: Amount,
        /// Current balance
        available: Amount,
    },

    /// Spender is not allowed to move that much on the owner's behalf
    #[error("Insufficient allowance of {token} from {owner} to {spender}: needed {needed}, available {available}")]
    InsufficientAllowance {
        /// Token
        token: Address,
        /// Owner of the funds
        owner: Address,
        /// Account pulling the funds
        spender: Address,
        /// Requested amount
        needed: Amount,
        /// Current allowance
        available: Amount,
    },

    /// Credit would overflow the recipient balance
    #[error("Balance overflow of {token} for {holder}")]
    Overflow {
        /// Token
        token: Address,
        /// Credited holder
        holder: Address,
    },
}
