//! Store trait definition (Port)
//!
//! Implementations must give every transaction all-or-nothing semantics and
//! serialize writers: a closure that returns `Err` leaves no trace.

use crate::error::StoreError;
use crate::history::History;
use crate::ledger::Ledger;

/// Combined store interface
pub trait Store: Send + Sync {
    /// Run a read-only query against the committed ledger
    fn read<T>(&self, query: impl FnOnce(&Ledger) -> T) -> Result<T, StoreError>;

    /// Run a read-only query against committed history
    fn history<T>(&self, query: impl FnOnce(&History) -> T) -> Result<T, StoreError>;

    /// Run a mutation atomically.
    ///
    /// The closure sees a private working copy; it is committed only if the
    /// closure returns `Ok`. Staged events and settled trades move to the
    /// history on commit.
    fn transact<T, E>(&self, operation: impl FnOnce(&mut Ledger) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>;
}
