//! Aggregate of every table.
//!
//! A `Ledger` is the unit of atomicity: transactions run against a clone and
//! replace the committed value only on success.

use crate::events::EventLog;
use crate::fees::FeeTable;
use crate::otc::OtcBook;
use crate::roles::RoleTable;
use crate::swappers::SwapperTable;
use crate::tokens::TokenLedger;
use crate::trades::TradeBook;
use settla_domain::{Address, Event};

/// Complete settlement state
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Custody account of the trade factory executor
    pub executor: Address,
    /// Role memberships
    pub roles: RoleTable,
    /// Swapper registry records
    pub swappers: SwapperTable,
    /// Fee configuration
    pub fees: FeeTable,
    /// Pending trades and indices
    pub trades: TradeBook,
    /// OTC offers
    pub otc: OtcBook,
    /// Token balances and allowances
    pub tokens: TokenLedger,
    /// Emitted events
    pub events: EventLog,
}

impl Ledger {
    /// Create an empty ledger for an executor and an OTC desk custody account
    pub fn new(executor: Address, desk: Address) -> Self {
        Self {
            executor,
            roles: RoleTable::new(),
            swappers: SwapperTable::new(),
            fees: FeeTable::new(Address::ZERO),
            trades: TradeBook::new(),
            otc: OtcBook::new(desk),
            tokens: TokenLedger::new(),
            events: EventLog::new(),
        }
    }

    /// Append an event to the log
    pub fn emit(&mut self, event: Event) -> i64 {
        tracing::trace!(event_type = event.event_type(), "Event appended");
        self.events.append(event)
    }
}
