//! Domain Events for Settla
//!
//! Every committed state change emits exactly one event.
//! Events are appended inside the same transaction as the change they describe,
//! so a rejected operation never leaves a signal behind.

use crate::entities::{Role, SwapperKind, TradeId};
use crate::value_objects::{Address, Amount, FeeRate, Slippage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain events (signals) for the trade factory and the OTC pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Role granted to a principal
    RoleGranted {
        /// Granted role
        role: Role,
        /// Recipient
        principal: Address,
        /// Admin that granted it
        sender: Address,
    },

    /// Role revoked from (or renounced by) a principal
    RoleRevoked {
        /// Revoked role
        role: Role,
        /// Former holder
        principal: Address,
        /// Admin or holder that revoked it
        sender: Address,
    },

    /// Swapper registered
    SwapperAdded {
        /// Swapper address
        swapper: Address,
        /// Optional name
        name: Option<String>,
        /// Settlement data mode
        kind: SwapperKind,
    },

    /// Swapper deprecated (emitted on every call, even if already deprecated)
    SwapperDeprecated {
        /// Swapper address
        swapper: Address,
    },

    /// Default swapper assigned to a strategy
    StrategySwapperSet {
        /// Strategy
        strategy: Address,
        /// Assigned swapper
        swapper: Address,
    },

    /// Global fee ceiling changed
    MaxFeeSet {
        /// New ceiling
        max_fee: FeeRate,
    },

    /// Fee receiver changed
    FeeReceiverSet {
        /// New receiver
        receiver: Address,
    },

    /// Per-swapper fee changed
    SwapperFeeSet {
        /// Swapper
        swapper: Address,
        /// New fee
        fee: FeeRate,
    },

    /// Pending trade created
    TradeCreated {
        /// Trade identifier
        id: TradeId,
        /// Owning strategy
        strategy: Address,
        /// Assigned swapper
        swapper: Address,
        /// Asset given up
        token_in: Address,
        /// Asset received
        token_out: Address,
        /// Amount of `token_in`
        amount_in: Amount,
        /// Slippage bound
        max_slippage: Slippage,
        /// Deadline
        deadline: DateTime<Utc>,
    },

    /// One pending trade cancelled by its strategy
    TradeCanceled {
        /// Trade identifier
        id: TradeId,
        /// Owning strategy
        strategy: Address,
    },

    /// Every pending trade of a strategy cancelled
    TradesCanceled {
        /// Owning strategy
        strategy: Address,
        /// Cancelled identifiers
        ids: Vec<TradeId>,
    },

    /// Pending trades of a strategy moved to another swapper
    TradesSwapperChanged {
        /// Owning strategy
        strategy: Address,
        /// Affected identifiers
        ids: Vec<TradeId>,
        /// New swapper
        swapper: Address,
    },

    /// Pending trade settled
    TradeExecuted {
        /// Trade identifier
        id: TradeId,
        /// Net amount credited to the strategy
        received: Amount,
    },

    /// Pending trade expired
    TradeExpired {
        /// Trade identifier
        id: TradeId,
    },

    /// Executor authorized a swapper to pull a token
    SwapperTokenEnabled {
        /// Swapper
        swapper: Address,
        /// Token
        token: Address,
    },

    /// OTC provider changed
    OtcProviderSet {
        /// New provider
        provider: Address,
    },

    /// Provider deposited inventory
    OtcDeposited {
        /// Provider
        provider: Address,
        /// Token given to the desk
        offered_token: Address,
        /// Token wanted in exchange
        wanted_token: Address,
        /// Amount deposited
        amount: Amount,
    },

    /// Provider withdrew inventory
    OtcWithdrawn {
        /// Provider
        provider: Address,
        /// Token taken back
        offered_token: Address,
        /// Bucket it was offered against
        wanted_token: Address,
        /// Amount withdrawn
        amount: Amount,
    },

    /// Swapper netted part of its exchange against the desk
    OtcOfferTaken {
        /// Swapper
        swapper: Address,
        /// Token the swapper gave
        offered_by_swapper: Address,
        /// Token the swapper received
        wanted_by_swapper: Address,
        /// Desk inventory handed to the swapper
        took_from_pool: Amount,
        /// Swapper tokens handed to the desk
        took_from_swapper: Amount,
    },

    /// Provider claimed acquired tokens
    OtcClaimed {
        /// Provider
        provider: Address,
        /// Claimed token
        token: Address,
        /// Claimed amount
        amount: Amount,
    },
}

impl Event {
    /// Get event type as string (for logging and filtering)
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::RoleGranted { .. } => "role_granted",
            Event::RoleRevoked { .. } => "role_revoked",
            Event::SwapperAdded { .. } => "swapper_added",
            Event::SwapperDeprecated { .. } => "swapper_deprecated",
            Event::StrategySwapperSet { .. } => "strategy_swapper_set",
            Event::MaxFeeSet { .. } => "max_fee_set",
            Event::FeeReceiverSet { .. } => "fee_receiver_set",
            Event::SwapperFeeSet { .. } => "swapper_fee_set",
            Event::TradeCreated { .. } => "trade_created",
            Event::TradeCanceled { .. } => "trade_canceled",
            Event::TradesCanceled { .. } => "trades_canceled",
            Event::TradesSwapperChanged { .. } => "trades_swapper_changed",
            Event::TradeExecuted { .. } => "trade_executed",
            Event::TradeExpired { .. } => "trade_expired",
            Event::SwapperTokenEnabled { .. } => "swapper_token_enabled",
            Event::OtcProviderSet { .. } => "otc_provider_set",
            Event::OtcDeposited { .. } => "otc_deposited",
            Event::OtcWithdrawn { .. } => "otc_withdrawn",
            Event::OtcOfferTaken { .. } => "otc_offer_taken",
            Event::OtcClaimed { .. } => "otc_claimed",
        }
    }

    /// Trade identifiers this event touches
    pub fn trade_ids(&self) -> Vec<TradeId> {
        match self {
            Event::TradeCreated { id, .. }
            | Event::TradeCanceled { id, .. }
            | Event::TradeExecuted { id, .. }
            | Event::TradeExpired { id } => vec![*id],
            Event::TradesCanceled { ids, .. } | Event::TradesSwapperChanged { ids, .. } => {
                ids.clone()
            },
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = Event::TradeExecuted { id: 7, received: 94 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "trade_executed");
        assert_eq!(json["id"], 7);

        let parsed: Event = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_trade_ids() {
        let event = Event::TradesCanceled { strategy: Address::from_low_u64(1), ids: vec![1, 3] };
        assert_eq!(event.trade_ids(), vec![1, 3]);
        assert_eq!(event.event_type(), "trades_canceled");
        assert!(Event::OtcProviderSet { provider: Address::ZERO }.trade_ids().is_empty());
    }
}
