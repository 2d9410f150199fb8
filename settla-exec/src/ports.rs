//! Swapper port definitions.
//!
//! A swapper is the external capability that turns `token_in` into
//! `token_out`. Adapters implement [`SwapperPort`] for a specific venue
//! (fixed-rate stub, off-chain quote, OTC netting).
//!
//! Swaps run inside the executor's transaction: the adapter receives the
//! open [`Ledger`] and every transfer it makes commits or rolls back with
//! the trade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use settla_domain::{Address, Amount, Slippage, SwapperKind};
use settla_store::Ledger;

use crate::error::SwapError;

// =============================================================================
// Swapper Port
// =============================================================================

/// Port for swap execution.
///
/// Implementations:
/// - `StubSwapper` - Fixed rates, synchronous fills
/// - `QuotedSwapper` - Off-chain quote carried in fill data
/// - `OtcSwapper` (settla-otc) - Nets against the OTC desk before routing
pub trait SwapperPort: Send + Sync {
    /// Custody account of the swapper
    fn address(&self) -> Address;

    /// Settlement data mode
    fn kind(&self) -> SwapperKind;

    /// Pull `amount_in` from the payer and deliver the output to the receiver.
    ///
    /// The payer has approved exactly `amount_in` to [`SwapperPort::address`].
    /// Returns the gross output delivered.
    fn swap(&self, ctx: &mut SwapContext<'_>, request: &SwapRequest) -> Result<Amount, SwapError>;

    /// Quote the output for an input amount without moving funds.
    fn total_amount_out(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: Amount,
    ) -> Result<Amount, SwapError>;
}

/// Open transaction handed to a swapper
pub struct SwapContext<'a> {
    /// Working copy of the ledger
    pub ledger: &'a mut Ledger,
    /// Time of the enclosing operation
    pub now: DateTime<Utc>,
}

/// Parameters of a single swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    /// Account funding the swap (the executor)
    pub payer: Address,
    /// Account receiving the gross output
    pub receiver: Address,
    /// Asset given up
    pub token_in: Address,
    /// Asset received
    pub token_out: Address,
    /// Amount of `token_in`
    pub amount_in: Amount,
    /// Tolerated deviation from the reference quote
    pub max_slippage: Slippage,
    /// Opaque data supplied by the mechanic (async swappers)
    pub fill_data: Option<FillData>,
}

// =============================================================================
// Fill Data
// =============================================================================

/// Opaque fill data, serialized as a 0x-prefixed hex string
#[derive(Clone, PartialEq, Eq, Default)]
pub struct FillData(Vec<u8>);

impl FillData {
    /// Wrap raw bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Encode a serializable payload as JSON bytes
    pub fn encode<T: Serialize>(payload: &T) -> Result<Self, SwapError> {
        serde_json::to_vec(payload)
            .map(Self)
            .map_err(|e| SwapError::InvalidFillData(e.to_string()))
    }

    /// Decode a JSON payload
    pub fn decode<'de, T: Deserialize<'de>>(&'de self) -> Result<T, SwapError> {
        serde_json::from_slice(&self.0).map_err(|e| SwapError::InvalidFillData(e.to_string()))
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for FillData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FillData(0x{})", hex::encode(&self.0))
    }
}

impl Serialize for FillData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(&self.0)))
    }
}

impl<'de> Deserialize<'de> for FillData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let digits = text.strip_prefix("0x").unwrap_or(&text);
        hex::decode(digits).map(Self).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Adapter Set
// =============================================================================

/// Installed swapper adapters, keyed by address.
///
/// Registry records say whether a swapper may trade; the adapter set holds
/// the code that trades. Shared between the trade factory and the OTC pool.
#[derive(Default)]
pub struct SwapperSet {
    adapters: RwLock<HashMap<Address, Arc<dyn SwapperPort>>>,
}

impl SwapperSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or replace) the adapter for its address
    pub fn install(&self, adapter: Arc<dyn SwapperPort>) {
        let mut adapters = self.adapters.write().unwrap_or_else(|e| e.into_inner());
        adapters.insert(adapter.address(), adapter);
    }

    /// Adapter for an address
    pub fn get(&self, address: Address) -> Result<Arc<dyn SwapperPort>, SwapError> {
        let adapters = self.adapters.read().unwrap_or_else(|e| e.into_inner());
        adapters.get(&address).cloned().ok_or(SwapError::NoAdapter(address))
    }

    /// Installed addresses
    pub fn addresses(&self) -> Vec<Address> {
        let adapters = self.adapters.read().unwrap_or_else(|e| e.into_inner());
        let mut addresses: Vec<Address> = adapters.keys().copied().collect();
        addresses.sort();
        addresses
    }
}

impl fmt::Debug for SwapperSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapperSet").field("adapters", &self.addresses()).finish()
    }
}
