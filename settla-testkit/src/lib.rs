//! Test helpers for Settla integration tests.
//!
//! Provides well-known accounts and a [`World`] with a trade factory and an
//! OTC pool sharing one in-memory store and a manual clock.

mod helpers;

pub use helpers::{addr, accounts, tokens, World};

/// Result type used by helpers
pub type Result<T> = anyhow::Result<T>;
