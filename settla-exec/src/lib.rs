//! Settla Trade Factory
//!
//! Strategies register swap intents; mechanics settle them through
//! registered swappers within a slippage bound and deadline.
//!
//! # Architecture
//!
//! ```text
//! Strategy → create → Pending Trade → Mechanic → execute → Swapper → Fees → Strategy
//! ```
//!
//! # Components
//!
//! - **Access**: role table checks and role administration
//! - **Registry**: swapper records, names and strategy assignments
//! - **Fees**: fee ceiling, receiver, per-swapper fees and skimming
//! - **Positions**: create, cancel and reassign pending trades
//! - **Executor**: execute and expire pending trades
//! - **Ports**: the swapper capability and the installed adapter set
//! - **Stub**: test swappers
//!
//! Operation modules work on an open [`settla_store::Ledger`], so they compose
//! inside one transaction. [`TradeFactory`] wraps each of them in its own.
//!
//! # Example
//!
//! ```rust,ignore
//! use settla_exec::{StubSwapper, SwapperSet, TradeFactory};
//! use settla_store::{Ledger, MemoryStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new(Ledger::new(executor, desk)));
//! let factory = TradeFactory::new(store, Arc::new(SwapperSet::new()), Arc::new(SystemClock));
//! factory.initialize(governor, fee_receiver)?;
//! factory.install_adapter(Arc::new(StubSwapper::new(venue, dec!(1))));
//! factory.add_swapper(governor, venue, Some("stub".into()), SwapperKind::Sync)?;
//! ```

#![warn(clippy::all)]

pub mod access;
pub mod error;
pub mod executor;
pub mod factory;
pub mod fees;
pub mod ports;
pub mod positions;
pub mod registry;
pub mod stub;

// Re-exports for convenience
pub use error::{FactoryError, FactoryResult, SwapError};
pub use executor::Execution;
pub use factory::TradeFactory;
pub use ports::{FillData, SwapContext, SwapRequest, SwapperPort, SwapperSet};
pub use positions::CreateTrade;
pub use registry::NameLookup;
pub use stub::{Quote, QuotedSwapper, StubSwapper};
