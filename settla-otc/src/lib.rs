//! Settla OTC Pool
//!
//! Internal inventory desk for one liquidity provider, and the netting
//! algorithm that fills a swapper's exchange from the desk before the
//! swapper goes to its own market.
//!
//! # Components
//!
//! - **Desk**: deposit, withdraw, claim, provider management
//! - **Tradeable**: take sizing and settlement against the desk
//! - **OtcSwapper**: swapper adapter that nets first, routes the rest
//! - **OtcPool**: transactional facade over the shared store

#![warn(clippy::all)]

pub mod desk;
pub mod error;
pub mod pool;
pub mod swapper;
pub mod tradeable;

pub use error::{OtcError, OtcResult};
pub use pool::OtcPool;
pub use swapper::OtcSwapper;
pub use tradeable::Take;
