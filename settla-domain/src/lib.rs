//! Settla Domain Layer
//!
//! Pure settlement types with zero I/O dependencies.
//! Contains value objects, entities, domain events and the clock port.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod clock;
pub mod entities;
pub mod events;
pub mod value_objects;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entities::{
    PendingTrade, Role, Settlement, Swapper, SwapperKind, SwapperRef, SwapperStatus, TradeId,
    TradeRecord, TradeState,
};
pub use events::Event;
pub use value_objects::{
    mul_div_floor, Address, Amount, DomainError, FeeRate, FeeSplit, Slippage, MAX_PRECISION,
    PRECISION,
};
