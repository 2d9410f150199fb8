//! Daemon error types.

use settla_domain::DomainError;
use settla_exec::FactoryError;
use settla_otc::OtcError;
use settla_store::StoreError;
use thiserror::Error;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Trade factory error
    #[error("Trade factory error: {0}")]
    Factory(#[from] FactoryError),

    /// OTC pool error
    #[error("OTC pool error: {0}")]
    Otc(#[from] OtcError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed journal line
    #[error("Replay error at line {line}: {message}")]
    Replay {
        /// 1-based line number
        line: usize,
        /// Parse failure
        message: String,
    },

    /// Journal I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
