//! Daemon configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::{DaemonError, DaemonResult};
use rust_decimal::Decimal;
use settla_domain::{Address, FeeRate};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Governance configuration
    pub governance: GovernanceConfig,

    /// OTC provider, if the pool is provisioned
    pub otc_provider: Option<Address>,

    /// Call journal to replay
    pub journal: Option<PathBuf>,

    /// Environment (test, development, production)
    pub environment: Environment,
}

/// Genesis governance settings.
#[derive(Debug, Clone)]
pub struct GovernanceConfig {
    /// Genesis governor
    pub governor: Address,
    /// Fee receiver
    pub fee_receiver: Address,
    /// Global fee ceiling
    pub max_fee: FeeRate,
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let environment = Self::load_environment()?;
        let governance = Self::load_governance(environment)?;
        let otc_provider = Self::load_optional_address("SETTLA_OTC_PROVIDER")?;
        let journal = env::var("SETTLA_JOURNAL").ok().map(PathBuf::from);

        Ok(Self { governance, otc_provider, journal, environment })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            governance: GovernanceConfig {
                governor: Address::from_low_u64(0x01),
                fee_receiver: Address::from_low_u64(0x02),
                max_fee: FeeRate::ZERO,
            },
            otc_provider: Some(Address::from_low_u64(0x30)),
            journal: None,
            environment: Environment::Test,
        }
    }

    fn load_environment() -> DaemonResult<Environment> {
        let env_str = env::var("SETTLA_ENV").unwrap_or_else(|_| "development".to_string());

        match env_str.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(DaemonError::Config(format!(
                "Invalid SETTLA_ENV: {}. Expected: test, development, production",
                other
            ))),
        }
    }

    fn load_governance(environment: Environment) -> DaemonResult<GovernanceConfig> {
        let defaults = Self::test().governance;
        let governor = match Self::load_optional_address("SETTLA_GOVERNOR")? {
            Some(governor) => governor,
            None if environment == Environment::Test => defaults.governor,
            None => return Err(DaemonError::Config("SETTLA_GOVERNOR is required".to_string())),
        };
        let fee_receiver = Self::load_optional_address("SETTLA_FEE_RECEIVER")?.unwrap_or(governor);

        let percent = Self::load_decimal_env("SETTLA_MAX_FEE_PERCENT", Decimal::ZERO)?;
        let max_fee = FeeRate::from_percent(percent)
            .map_err(|e| DaemonError::Config(format!("Invalid SETTLA_MAX_FEE_PERCENT: {}", e)))?;

        Ok(GovernanceConfig { governor, fee_receiver, max_fee })
    }

    fn load_optional_address(key: &str) -> DaemonResult<Option<Address>> {
        match env::var(key) {
            Ok(val) => Address::from_str(val.trim())
                .map(Some)
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            Err(_) => Ok(None),
        }
    }

    fn load_decimal_env(key: &str, default: Decimal) -> DaemonResult<Decimal> {
        match env::var(key) {
            Ok(val) => Decimal::from_str(&val)
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { environment: Environment::Development, otc_provider: None, ..Self::test() }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
