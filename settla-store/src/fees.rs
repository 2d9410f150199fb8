//! Fee configuration table.

use settla_domain::{Address, FeeRate};
use std::collections::BTreeMap;

/// Global fee ceiling, receiver and per-swapper fees
#[derive(Debug, Clone, Default)]
pub struct FeeTable {
    /// Ceiling for every per-swapper fee
    pub max_fee: FeeRate,
    /// Destination of every skimmed fee
    pub fee_receiver: Address,
    swapper_fee: BTreeMap<Address, FeeRate>,
}

impl FeeTable {
    /// Create a table with zero ceiling and the given receiver
    pub fn new(fee_receiver: Address) -> Self {
        Self { max_fee: FeeRate::ZERO, fee_receiver, swapper_fee: BTreeMap::new() }
    }

    /// Fee configured for a swapper (zero if unset)
    pub fn swapper_fee(&self, swapper: Address) -> FeeRate {
        self.swapper_fee.get(&swapper).copied().unwrap_or(FeeRate::ZERO)
    }

    /// Set a swapper's fee
    pub fn set_swapper_fee(&mut self, swapper: Address, fee: FeeRate) {
        if fee.is_zero() {
            self.swapper_fee.remove(&swapper);
        } else {
            self.swapper_fee.insert(swapper, fee);
        }
    }
}
