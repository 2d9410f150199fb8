//! Value Objects for the Settla Domain
//!
//! Immutable, validated primitives shared by every layer.
//! All value objects enforce invariants at construction time.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Domain errors for value object validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Address could not be parsed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Fee exceeds the fixed-point ceiling (100%)
    #[error("Fee {fee} exceeds precision ceiling {ceiling}")]
    FeeExceedsPrecision {
        /// Requested fee in fixed-point units
        fee: u128,
        /// Maximum representable fee
        ceiling: u128,
    },

    /// Slippage bound must be positive
    #[error("Slippage must be greater than zero")]
    ZeroSlippage,

    /// Percentage could not be converted to fixed point
    #[error("Invalid percentage: {0}")]
    InvalidPercentage(String),
}

// =============================================================================
// Fixed point
// =============================================================================

/// Fixed-point base: one percent is `PRECISION` units.
pub const PRECISION: u128 = 10_000;

/// 100% expressed in fixed-point units.
pub const MAX_PRECISION: u128 = PRECISION * 100;

/// Token amount in the asset's smallest unit.
pub type Amount = u128;

/// Computes `floor(value * numerator / denominator)` without intermediate overflow.
///
/// Requires `numerator <= denominator` and `denominator > 0`, which holds for every
/// fee and slippage ratio in this crate (both are capped at [`MAX_PRECISION`]).
pub fn mul_div_floor(value: Amount, numerator: u128, denominator: u128) -> Amount {
    debug_assert!(denominator > 0 && numerator <= denominator);
    let quotient = value / denominator;
    let remainder = value % denominator;
    quotient * numerator + remainder * numerator / denominator
}

// =============================================================================
// Address
// =============================================================================

/// 20-byte principal identifier (strategies, swappers, tokens, custody accounts).
///
/// The zero address is representable but rejected by every operation that
/// takes a token or recipient.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// The zero address
    pub const ZERO: Address = Address([0u8; 20]);

    /// Wrap raw bytes
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build an address whose trailing eight bytes hold `value` (big endian).
    ///
    /// Handy for deterministic fixtures and well-known system accounts.
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Check for the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(stripped)
            .map_err(|e| DomainError::InvalidAddress(format!("{}: {}", s, e)))?;
        let bytes: [u8; 20] = decoded
            .try_into()
            .map_err(|_| DomainError::InvalidAddress(format!("{}: expected 20 bytes", s)))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// FeeRate
// =============================================================================

/// Fee charged on settlement proceeds, in fixed-point units of [`PRECISION`] per percent.
///
/// # Invariants
/// - Must be <= [`MAX_PRECISION`] (100%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct FeeRate(u128);

/// Result of skimming a fee off a gross amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Amount routed to the fee receiver
    pub fee: Amount,
    /// Amount left for the beneficiary
    pub net: Amount,
}

impl FeeRate {
    /// Zero fee
    pub const ZERO: FeeRate = FeeRate(0);

    /// Create a fee rate with validation
    ///
    /// # Errors
    /// Returns `DomainError::FeeExceedsPrecision` if value > 100%
    pub fn new(value: u128) -> Result<Self, DomainError> {
        if value > MAX_PRECISION {
            return Err(DomainError::FeeExceedsPrecision { fee: value, ceiling: MAX_PRECISION });
        }
        Ok(Self(value))
    }

    /// Convert a human percentage (e.g. `1.5` for 1.5%) into fixed point.
    ///
    /// Digits below the fixed-point resolution are truncated.
    ///
    /// # Examples
    /// ```
    /// # use settla_domain::value_objects::{FeeRate, PRECISION};
    /// # use rust_decimal_macros::dec;
    /// let rate = FeeRate::from_percent(dec!(1)).unwrap();
    /// assert_eq!(rate.units(), PRECISION);
    /// ```
    pub fn from_percent(percent: Decimal) -> Result<Self, DomainError> {
        if percent.is_sign_negative() {
            return Err(DomainError::InvalidPercentage(format!("{} is negative", percent)));
        }
        let units = (percent * Decimal::from(PRECISION as u64))
            .trunc()
            .to_u128()
            .ok_or_else(|| DomainError::InvalidPercentage(percent.to_string()))?;
        Self::new(units)
    }

    /// Raw fixed-point units
    pub fn units(&self) -> u128 {
        self.0
    }

    /// Check for a zero fee
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Split a gross amount into fee and net.
    ///
    /// `fee = floor(gross * rate / MAX_PRECISION)`; the remainder of the floor
    /// stays with the net amount, so `fee + net == gross` always holds.
    pub fn split(&self, gross: Amount) -> FeeSplit {
        let fee = mul_div_floor(gross, self.0, MAX_PRECISION);
        FeeSplit { fee, net: gross - fee }
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let percent = Decimal::from_i128_with_scale(self.0 as i128, 0)
            / Decimal::from(PRECISION as u64);
        write!(f, "{}%", percent.normalize())
    }
}

// =============================================================================
// Slippage
// =============================================================================

/// Maximum tolerated deviation from a reference quote, same fixed point as [`FeeRate`].
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slippage(u128);

impl Slippage {
    /// Create a slippage bound with validation
    ///
    /// # Errors
    /// Returns `DomainError::ZeroSlippage` if value == 0
    pub fn new(value: u128) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::ZeroSlippage);
        }
        Ok(Self(value))
    }

    /// Build from basis points (100 bps = 1%)
    pub fn from_bps(bps: u32) -> Result<Self, DomainError> {
        Self::new(u128::from(bps) * PRECISION / 100)
    }

    /// Raw fixed-point units
    pub fn units(&self) -> u128 {
        self.0
    }

    /// Smallest acceptable output for a reference quote.
    ///
    /// Bounds above 100% saturate at zero.
    pub fn min_out(&self, reference: Amount) -> Amount {
        let tolerated = self.0.min(MAX_PRECISION);
        reference - mul_div_floor(reference, tolerated, MAX_PRECISION)
    }
}

impl fmt::Display for Slippage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
