//! # Fixed-Point Decimal
//!
//! Non-negative decimal with 18 fractional digits, backed by `U256`.
//!
//! All multiply-then-divide operations widen to `U512` before dividing, so
//! `a * b / c` never overflows in the intermediate product and truncation
//! happens exactly once, at the end.

use primitive_types::{U256, U512};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional digits carried by [`Dec`].
pub const PRECISION: usize = 18;

/// `10^PRECISION` as a `U256`.
pub fn precision_multiplier() -> U256 {
    U256::exp10(PRECISION)
}

/// Error parsing a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid decimal '{input}': {reason}")]
pub struct DecParseError {
    pub input: String,
    pub reason: &'static str,
}

/// Non-negative fixed-point decimal.
///
/// The wrapped value is the amount scaled by `10^18`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dec(U256);

impl Dec {
    pub fn zero() -> Self {
        Dec(U256::zero())
    }

    pub fn one() -> Self {
        Dec(precision_multiplier())
    }

    /// Wrap an already-scaled value.
    pub fn from_raw(raw: U256) -> Self {
        Dec(raw)
    }

    /// The scaled representation.
    pub fn raw(&self) -> U256 {
        self.0
    }

    /// Integer to decimal. Returns `None` if the scaled value overflows.
    pub fn from_int(value: U256) -> Option<Self> {
        value.checked_mul(precision_multiplier()).map(Dec)
    }

    pub fn from_u64(value: u64) -> Self {
        // 2^64 * 10^18 < 2^256
        Dec(U256::from(value) * precision_multiplier())
    }

    /// `numerator / denominator` as a decimal, truncated.
    pub fn from_ratio(numerator: U256, denominator: U256) -> Option<Self> {
        mul_div_floor(numerator, precision_multiplier(), denominator).map(Dec)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.0.is_zero()
    }

    pub fn checked_add(self, other: Dec) -> Option<Dec> {
        self.0.checked_add(other.0).map(Dec)
    }

    pub fn checked_sub(self, other: Dec) -> Option<Dec> {
        self.0.checked_sub(other.0).map(Dec)
    }

    /// Integer part, fractional digits discarded.
    pub fn truncate_int(&self) -> U256 {
        self.0 / precision_multiplier()
    }

    /// Integer part rounded half-up.
    pub fn round_int(&self) -> U256 {
        let multiplier = precision_multiplier();
        let quotient = self.0 / multiplier;
        let remainder = self.0 % multiplier;
        if remainder * U256::from(2u8) >= multiplier {
            quotient + U256::one()
        } else {
            quotient
        }
    }

    /// `self * numerator / denominator`, truncated toward zero.
    pub fn mul_div_floor(self, numerator: U256, denominator: U256) -> Option<Dec> {
        mul_div_floor(self.0, numerator, denominator).map(Dec)
    }

    /// `self * other`, truncated.
    pub fn checked_mul(self, other: Dec) -> Option<Dec> {
        mul_div_floor(self.0, other.0, precision_multiplier()).map(Dec)
    }

    /// `self / other`, truncated. `None` on division by zero.
    pub fn checked_quo(self, other: Dec) -> Option<Dec> {
        mul_div_floor(self.0, precision_multiplier(), other.0).map(Dec)
    }
}

/// `a * b / c` with a 512-bit intermediate, truncated toward zero.
///
/// Returns `None` when `c` is zero or the quotient does not fit in 256 bits.
pub fn mul_div_floor(a: U256, b: U256, c: U256) -> Option<U256> {
    if c.is_zero() {
        return None;
    }
    let quotient = a.full_mul(b) / U512::from(c);
    U256::try_from(quotient).ok()
}

/// `a * b / c` with a 512-bit intermediate, rounded half-up.
pub fn mul_div_round(a: U256, b: U256, c: U256) -> Option<U256> {
    if c.is_zero() {
        return None;
    }
    let product = a.full_mul(b);
    let divisor = U512::from(c);
    let mut quotient = product / divisor;
    let remainder = product % divisor;
    if remainder * U512::from(2u8) >= divisor {
        quotient += U512::one();
    }
    U256::try_from(quotient).ok()
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let multiplier = precision_multiplier();
        let integer = self.0 / multiplier;
        // 10^18 < 2^64, so the fractional part always fits in a u64.
        let fraction = (self.0 % multiplier).low_u64();
        write!(f, "{}.{:018}", integer, fraction)
    }
}

impl FromStr for Dec {
    type Err = DecParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| DecParseError {
            input: s.to_string(),
            reason,
        };

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() {
            return Err(err("missing integer part"));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(err("non-digit character"));
        }
        if frac_part.len() > PRECISION {
            return Err(err("too many fractional digits"));
        }

        let integer = U256::from_dec_str(int_part).map_err(|_| err("integer part out of range"))?;
        let mut fraction = U256::zero();
        if !frac_part.is_empty() {
            let padded = format!("{:0<width$}", frac_part, width = PRECISION);
            fraction = U256::from_dec_str(&padded).map_err(|_| err("bad fractional part"))?;
        }

        integer
            .checked_mul(precision_multiplier())
            .and_then(|scaled| scaled.checked_add(fraction))
            .map(Dec)
            .ok_or_else(|| err("value out of range"))
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Dec::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde helper writing `U256` as a decimal string instead of `0x`-hex.
pub mod u256_dec_str {
    use primitive_types::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        U256::from_dec_str(&s).map_err(|e| serde::de::Error::custom(format!("{:?}", e)))
    }
}
