//! Settla Storage Layer
//!
//! Owns the four logical tables (roles, swappers, pending trades, OTC offers)
//! plus fee configuration, token custody and the event log.
//!
//! # Architecture
//!
//! - **Tables**: plain data structures that keep their own indices consistent
//! - **Ledger**: every table in one cloneable value
//! - **Store trait**: read access and all-or-nothing transactions (port)
//! - **In-memory store**: `RwLock<Ledger>` implementation
//!
//! # Usage
//!
//! ```rust
//! use settla_domain::Address;
//! use settla_store::{Ledger, MemoryStore, Store, StoreError};
//!
//! let executor = Address::from_low_u64(0xe0);
//! let store = MemoryStore::new(Ledger::new(executor, Address::from_low_u64(0xd0)));
//! let token = Address::from_low_u64(0x70);
//!
//! store
//!     .transact(|ledger| -> Result<(), StoreError> {
//!         ledger.tokens.mint(token, executor, 10).map_err(|e| StoreError::InvalidState {
//!             message: e.to_string(),
//!         })
//!     })
//!     .unwrap();
//!
//! let balance = store.read(|ledger| ledger.tokens.balance_of(token, executor)).unwrap();
//! assert_eq!(balance, 10);
//! ```

#![warn(clippy::all)]

// Modules
mod error;
mod events;
mod fees;
mod history;
mod ledger;
mod memory;
mod otc;
mod repository;
mod roles;
mod swappers;
mod tokens;
mod trades;

// Re-exports
pub use error::{StoreError, TransferError};
pub use events::{EventLog, StoredEvent};
pub use fees::FeeTable;
pub use history::History;
pub use ledger::Ledger;
pub use memory::MemoryStore;
pub use otc::OtcBook;
pub use repository::Store;
pub use roles::RoleTable;
pub use swappers::SwapperTable;
pub use tokens::TokenLedger;
pub use trades::TradeBook;
