//! Swapper that nets against the OTC desk before going to its market.

use std::sync::Arc;

use settla_domain::{Address, Amount, SwapperKind};
use settla_exec::{SwapContext, SwapError, SwapRequest, SwapperPort};

use crate::tradeable;

/// Sync swapper wired to the OTC pool.
///
/// Fills as much of each swap as the desk offers, then sources the
/// remainder from `market`. Prices always come from `market`.
pub struct OtcSwapper {
    address: Address,
    market: Arc<dyn SwapperPort>,
}

impl OtcSwapper {
    /// Create an OTC-netting swapper in front of a market adapter
    pub fn new(address: Address, market: Arc<dyn SwapperPort>) -> Self {
        Self { address, market }
    }
}

impl SwapperPort for OtcSwapper {
    fn address(&self) -> Address {
        self.address
    }

    fn kind(&self) -> SwapperKind {
        SwapperKind::Sync
    }

    fn swap(&self, ctx: &mut SwapContext<'_>, request: &SwapRequest) -> Result<Amount, SwapError> {
        let reference = self.total_amount_out(request.token_in, request.token_out, request.amount_in)?;

        ctx.ledger.tokens.transfer_from(
            request.token_in,
            self.address,
            request.payer,
            self.address,
            request.amount_in,
        )?;

        let take = tradeable::take_offer(
            ctx.ledger,
            self,
            self.address,
            request.token_in,
            request.token_out,
            request.amount_in,
        )
        .map_err(|e| SwapError::Venue(e.to_string()))?;

        let remainder = request.amount_in.saturating_sub(take.took_from_swapper);
        let from_market = if remainder > 0 {
            let market = self.market.address();
            ctx.ledger.tokens.approve(request.token_in, self.address, market, remainder);
            let routed = SwapRequest {
                payer: self.address,
                receiver: self.address,
                amount_in: remainder,
                fill_data: None,
                ..request.clone()
            };
            self.market.swap(ctx, &routed)?
        } else {
            0
        };

        let amount_out = take.took_from_pool + from_market;
        let min_out = request.max_slippage.min_out(reference);
        if amount_out < min_out {
            return Err(SwapError::SlippageExceeded { min_out, amount_out });
        }
        ctx.ledger
            .tokens
            .transfer(request.token_out, self.address, request.receiver, amount_out)?;

        tracing::debug!(
            swapper = %self.address,
            took_from_pool = take.took_from_pool,
            took_from_swapper = take.took_from_swapper,
            from_market,
            "OTC swap filled"
        );
        Ok(amount_out)
    }

    fn total_amount_out(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: Amount,
    ) -> Result<Amount, SwapError> {
        self.market.total_amount_out(token_in, token_out, amount_in)
    }
}
