//! Swapper registry.
//!
//! Records are added once and never removed; deprecation flips the status.
//! A swapper is valid when it is registered and active.

use chrono::{DateTime, Utc};
use settla_domain::{Address, Event, Role, Swapper, SwapperKind, SwapperRef};
use settla_store::Ledger;

use crate::access;
use crate::error::{FactoryError, FactoryResult};

/// Result of a lookup by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameLookup {
    /// Registered and active
    pub valid: bool,
    /// Address behind the name (zero if unknown)
    pub address: Address,
    /// Settlement data mode, if registered
    pub kind: Option<SwapperKind>,
}

/// Register a swapper. Caller must hold SwapperAdder.
pub fn add(
    ledger: &mut Ledger,
    caller: Address,
    address: Address,
    name: Option<String>,
    kind: SwapperKind,
    now: DateTime<Utc>,
) -> FactoryResult<()> {
    access::require(ledger, Role::SwapperAdder, caller)?;
    if address.is_zero() {
        return Err(FactoryError::InvalidSwapper("zero address".to_string()));
    }
    if matches!(&name, Some(n) if n.is_empty()) {
        return Err(FactoryError::InvalidSwapper("empty name".to_string()));
    }
    if ledger.swappers.get(address).is_some() {
        return Err(FactoryError::DuplicateSwapper(address.to_string()));
    }
    if let Some(taken) = name.as_deref().filter(|n| ledger.swappers.by_name(n).is_some()) {
        return Err(FactoryError::DuplicateSwapper(taken.to_string()));
    }

    ledger.swappers.insert(Swapper::new(address, name.clone(), kind, now))?;
    ledger.emit(Event::SwapperAdded { swapper: address, name, kind });
    Ok(())
}

/// Mark a swapper deprecated. Caller must hold SwapperAdder or Governor.
///
/// Deprecating twice succeeds and signals both times.
pub fn deprecate(ledger: &mut Ledger, caller: Address, address: Address) -> FactoryResult<()> {
    access::require_any(ledger, &[Role::SwapperAdder, Role::Governor], caller)?;
    if ledger.swappers.get(address).is_none() {
        return Err(FactoryError::UnknownSwapper(address));
    }
    ledger.swappers.deprecate(address)?;
    ledger.emit(Event::SwapperDeprecated { swapper: address });
    Ok(())
}

/// Registered and active
pub fn is_valid(ledger: &Ledger, address: Address) -> bool {
    ledger.swappers.get(address).map(Swapper::is_active).unwrap_or(false)
}

/// Look a swapper up by name
pub fn is_valid_name(ledger: &Ledger, name: &str) -> NameLookup {
    match ledger.swappers.by_name(name) {
        Some(swapper) => NameLookup {
            valid: swapper.is_active(),
            address: swapper.address,
            kind: Some(swapper.kind),
        },
        None => NameLookup { valid: false, address: Address::ZERO, kind: None },
    }
}

/// Resolve a swapper reference for `strategy` to a valid address.
///
/// Any reference that does not land on an active swapper fails with
/// `NoStrategySwapper`.
pub fn resolve(ledger: &Ledger, strategy: Address, swapper: &SwapperRef) -> FactoryResult<Address> {
    let candidate = match swapper {
        SwapperRef::Assigned => ledger.swappers.assigned(strategy),
        SwapperRef::Address(address) => Some(*address),
        SwapperRef::Name(name) => ledger.swappers.by_name(name).map(|s| s.address),
    };
    candidate
        .filter(|address| is_valid(ledger, *address))
        .ok_or(FactoryError::NoStrategySwapper(strategy))
}

/// Resolve a reference to any valid swapper, independent of a strategy
pub fn resolve_valid(ledger: &Ledger, swapper: &SwapperRef) -> FactoryResult<Address> {
    let candidate = match swapper {
        SwapperRef::Assigned => None,
        SwapperRef::Address(address) => Some(*address),
        SwapperRef::Name(name) => ledger.swappers.by_name(name).map(|s| s.address),
    };
    candidate
        .filter(|address| is_valid(ledger, *address))
        .ok_or_else(|| FactoryError::InvalidSwapper(describe(swapper)))
}

/// Assign the default swapper of a strategy. Caller must hold SwapperSetter.
pub fn set_strategy_swapper(
    ledger: &mut Ledger,
    caller: Address,
    strategy: Address,
    swapper: &SwapperRef,
) -> FactoryResult<Address> {
    access::require(ledger, Role::SwapperSetter, caller)?;
    if strategy.is_zero() {
        return Err(FactoryError::ZeroAddress);
    }
    let address = resolve_valid(ledger, swapper)?;
    ledger.swappers.assign(strategy, address);
    ledger.emit(Event::StrategySwapperSet { strategy, swapper: address });
    Ok(address)
}

fn describe(swapper: &SwapperRef) -> String {
    match swapper {
        SwapperRef::Assigned => "assigned".to_string(),
        SwapperRef::Address(address) => address.to_string(),
        SwapperRef::Name(name) => name.clone(),
    }
}
