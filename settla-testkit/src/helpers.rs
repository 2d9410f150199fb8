//! Fixture builders.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

use settla_domain::{Address, Amount, Clock, ManualClock, Role, SwapperRef, TradeId};
use settla_exec::{CreateTrade, FactoryError, QuotedSwapper, StubSwapper, SwapperPort, SwapperSet, TradeFactory};
use settla_otc::{OtcPool, OtcSwapper};
use settla_store::{Ledger, MemoryStore, Store};

use crate::Result;

/// Address with `n` in its low bytes
pub fn addr(n: u64) -> Address {
    Address::from_low_u64(n)
}

/// Well-known principals
pub mod accounts {
    use super::addr;
    use settla_domain::Address;

    /// Governor
    pub fn governor() -> Address {
        addr(0x01)
    }
    /// Fee receiver
    pub fn fee_receiver() -> Address {
        addr(0x02)
    }
    /// Strategy
    pub fn strategy() -> Address {
        addr(0x10)
    }
    /// Second strategy
    pub fn other_strategy() -> Address {
        addr(0x11)
    }
    /// Mechanic
    pub fn mechanic() -> Address {
        addr(0x20)
    }
    /// OTC provider
    pub fn provider() -> Address {
        addr(0x30)
    }
    /// Executor custody
    pub fn executor() -> Address {
        addr(0xe0)
    }
    /// OTC desk custody
    pub fn desk() -> Address {
        addr(0xd0)
    }
}

/// Well-known tokens
pub mod tokens {
    use super::addr;
    use settla_domain::Address;

    /// Token A
    pub fn a() -> Address {
        addr(0x7a)
    }
    /// Token B
    pub fn b() -> Address {
        addr(0x7b)
    }
}

/// Factory and pool over one store, with every role handed out
pub struct World {
    /// Shared store
    pub store: Arc<MemoryStore>,
    /// Manual clock driving deadlines
    pub clock: Arc<ManualClock>,
    /// Installed swapper adapters
    pub swappers: Arc<SwapperSet>,
    /// Trade factory
    pub factory: TradeFactory<MemoryStore>,
    /// OTC pool
    pub pool: OtcPool<MemoryStore>,
}

impl World {
    /// Build a world at a fixed start time.
    ///
    /// The governor also holds StrategyAdmin, SwapperAdder, SwapperSetter and
    /// FeeSetter; `strategy()` and `other_strategy()` hold Strategy;
    /// `mechanic()` holds Mechanic; `provider()` is the OTC provider.
    pub fn new() -> Result<Self> {
        let start = Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| anyhow::anyhow!("invalid start time"))?;
        let store = Arc::new(MemoryStore::new(Ledger::new(accounts::executor(), accounts::desk())));
        let clock = Arc::new(ManualClock::new(start));
        let swappers = Arc::new(SwapperSet::new());
        let factory = TradeFactory::new(store.clone(), swappers.clone(), clock.clone());
        let pool = OtcPool::new(store.clone(), swappers.clone());

        let governor = accounts::governor();
        factory.initialize(governor, accounts::fee_receiver())?;
        for role in [Role::StrategyAdmin, Role::SwapperAdder, Role::SwapperSetter, Role::FeeSetter] {
            factory.grant_role(governor, role, governor)?;
        }
        factory.grant_role(governor, Role::Strategy, accounts::strategy())?;
        factory.grant_role(governor, Role::Strategy, accounts::other_strategy())?;
        factory.grant_role(governor, Role::Mechanic, accounts::mechanic())?;
        pool.set_provider(governor, accounts::provider())?;

        Ok(Self { store, clock, swappers, factory, pool })
    }

    /// Current time on the manual clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Move the clock forward
    pub fn advance(&self, seconds: i64) {
        self.clock.advance(Duration::seconds(seconds));
    }

    /// Install and register an adapter
    pub fn register(&self, adapter: Arc<dyn SwapperPort>, name: &str) -> Result<()> {
        let (address, kind) = (adapter.address(), adapter.kind());
        self.factory.install_adapter(adapter);
        self.factory.add_swapper(accounts::governor(), address, Some(name.to_string()), kind)?;
        Ok(())
    }

    /// Register a fixed-rate swapper holding `inventory` of every token
    pub fn add_stub_swapper(&self, address: Address, name: &str, rate: Decimal, inventory: Amount) -> Result<Arc<StubSwapper>> {
        let swapper = Arc::new(StubSwapper::new(address, rate));
        self.register(swapper.clone(), name)?;
        self.mint(tokens::a(), address, inventory)?;
        self.mint(tokens::b(), address, inventory)?;
        Ok(swapper)
    }

    /// Register an off-chain-quoted swapper holding `inventory` of every token
    pub fn add_quoted_swapper(&self, address: Address, name: &str, inventory: Amount) -> Result<Arc<QuotedSwapper>> {
        let swapper = Arc::new(QuotedSwapper::new(address));
        self.register(swapper.clone(), name)?;
        self.mint(tokens::a(), address, inventory)?;
        self.mint(tokens::b(), address, inventory)?;
        Ok(swapper)
    }

    /// Register an OTC-netting swapper in front of `market` (installed, not registered)
    pub fn add_otc_swapper(&self, address: Address, name: &str, market: Arc<dyn SwapperPort>) -> Result<Arc<OtcSwapper>> {
        self.factory.install_adapter(market.clone());
        let swapper = Arc::new(OtcSwapper::new(address, market));
        self.register(swapper.clone(), name)?;
        Ok(swapper)
    }

    /// Mint tokens to a holder
    pub fn mint(&self, token: Address, to: Address, amount: Amount) -> Result<()> {
        self.store.transact(|ledger| -> std::result::Result<(), FactoryError> {
            ledger.tokens.mint(token, to, amount)?;
            Ok(())
        })?;
        Ok(())
    }

    /// Set an allowance
    pub fn approve(&self, token: Address, owner: Address, spender: Address, amount: Amount) -> Result<()> {
        self.store.transact(|ledger| -> std::result::Result<(), FactoryError> {
            ledger.tokens.approve(token, owner, spender, amount);
            Ok(())
        })?;
        Ok(())
    }

    /// Balance of a holder
    pub fn balance(&self, token: Address, holder: Address) -> Result<Amount> {
        Ok(self.store.read(|ledger| ledger.tokens.balance_of(token, holder))?)
    }

    /// Allowance from owner to spender
    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<Amount> {
        Ok(self.store.read(|ledger| ledger.tokens.allowance(token, owner, spender))?)
    }

    /// Mint to a strategy and authorize the executor to pull it
    pub fn fund_strategy(&self, strategy: Address, token: Address, amount: Amount) -> Result<()> {
        self.mint(token, strategy, amount)?;
        self.approve(token, strategy, accounts::executor(), amount)
    }

    /// A→B trade request through a named swapper, 1% slippage
    pub fn request(&self, swapper: &str, amount_in: Amount, deadline_secs: i64) -> CreateTrade {
        CreateTrade {
            swapper: SwapperRef::from(swapper),
            token_in: tokens::a(),
            token_out: tokens::b(),
            amount_in,
            max_slippage: 10_000,
            deadline: self.now() + Duration::seconds(deadline_secs),
        }
    }

    /// Fund `strategy()` and create an A→B trade
    pub fn create_trade(&self, swapper: &str, amount_in: Amount, deadline_secs: i64) -> Result<TradeId> {
        let strategy = accounts::strategy();
        self.fund_strategy(strategy, tokens::a(), amount_in)?;
        Ok(self.factory.create(strategy, &self.request(swapper, amount_in, deadline_secs))?)
    }

    /// Clone of the committed ledger
    pub fn ledger(&self) -> Result<Ledger> {
        Ok(self.store.snapshot()?)
    }
}
