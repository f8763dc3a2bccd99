//! # Multi-Denomination Amounts
//!
//! `Coins` holds integer token amounts, `DecCoins` holds decimal amounts
//! (used for delegator shares). Both are kept sorted by denomination and
//! never contain zero entries, so equality is structural.

use super::decimal::{u256_dec_str, Dec};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Validate a denomination string.
///
/// Accepted form: a leading ASCII letter followed by 2..=127 characters from
/// `[a-zA-Z0-9/:._-]`.
pub fn validate_denom(denom: &str) -> Result<(), String> {
    let bytes = denom.as_bytes();
    if bytes.len() < 3 || bytes.len() > 128 {
        return Err(format!("invalid denom length: {}", denom));
    }
    if !bytes[0].is_ascii_alphabetic() {
        return Err(format!("denom must start with a letter: {}", denom));
    }
    let ok = bytes[1..]
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'/' | b':' | b'.' | b'_' | b'-'));
    if !ok {
        return Err(format!("invalid denom character: {}", denom));
    }
    Ok(())
}

/// A single integer amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(with = "u256_dec_str")]
    pub amount: U256,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<U256>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

/// Sorted, zero-free set of integer amounts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coin>", into = "Vec<Coin>")]
pub struct Coins(BTreeMap<String, U256>);

impl Coins {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a list, rejecting duplicate or malformed denominations.
    /// Zero amounts are dropped.
    pub fn new(coins: Vec<Coin>) -> Result<Self, String> {
        let mut map = BTreeMap::new();
        for coin in coins {
            validate_denom(&coin.denom)?;
            if map.contains_key(&coin.denom) {
                return Err(format!("duplicate denom: {}", coin.denom));
            }
            if !coin.amount.is_zero() {
                map.insert(coin.denom, coin.amount);
            }
        }
        Ok(Self(map))
    }

    /// Single-denomination amount. Denomination is not validated.
    pub fn single(denom: impl Into<String>, amount: impl Into<U256>) -> Self {
        let amount = amount.into();
        let mut map = BTreeMap::new();
        if !amount.is_zero() {
            map.insert(denom.into(), amount);
        }
        Self(map)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn amount_of(&self, denom: &str) -> U256 {
        self.0.get(denom).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &U256)> {
        self.0.iter()
    }

    pub fn denoms(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.0.keys().try_for_each(|d| validate_denom(d))
    }

    pub fn checked_add(&self, other: &Coins) -> Option<Coins> {
        let mut map = self.0.clone();
        for (denom, amount) in &other.0 {
            let entry = map.entry(denom.clone()).or_insert_with(U256::zero);
            *entry = entry.checked_add(*amount)?;
        }
        Some(Coins(map))
    }

    /// `None` if any denomination would go negative.
    pub fn checked_sub(&self, other: &Coins) -> Option<Coins> {
        let mut map = self.0.clone();
        for (denom, amount) in &other.0 {
            let current = map.get(denom).copied().unwrap_or_default();
            let remaining = current.checked_sub(*amount)?;
            if remaining.is_zero() {
                map.remove(denom);
            } else {
                map.insert(denom.clone(), remaining);
            }
        }
        Some(Coins(map))
    }

    /// True if every denomination in `other` is covered by `self`.
    pub fn is_all_gte(&self, other: &Coins) -> bool {
        other.0.iter().all(|(denom, amount)| self.amount_of(denom) >= *amount)
    }
}

impl TryFrom<Vec<Coin>> for Coins {
    type Error = String;

    fn try_from(coins: Vec<Coin>) -> Result<Self, Self::Error> {
        Coins::new(coins)
    }
}

impl From<Coins> for Vec<Coin> {
    fn from(coins: Coins) -> Self {
        coins
            .0
            .into_iter()
            .map(|(denom, amount)| Coin { denom, amount })
            .collect()
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(d, a)| format!("{}{}", a, d)).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// A single decimal amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecCoin {
    pub denom: String,
    pub amount: Dec,
}

/// Sorted, zero-free set of decimal amounts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DecCoin>", into = "Vec<DecCoin>")]
pub struct DecCoins(BTreeMap<String, Dec>);

impl DecCoins {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(coins: Vec<DecCoin>) -> Result<Self, String> {
        let mut map = BTreeMap::new();
        for coin in coins {
            validate_denom(&coin.denom)?;
            if map.contains_key(&coin.denom) {
                return Err(format!("duplicate denom: {}", coin.denom));
            }
            if !coin.amount.is_zero() {
                map.insert(coin.denom, coin.amount);
            }
        }
        Ok(Self(map))
    }

    pub fn single(denom: impl Into<String>, amount: Dec) -> Self {
        let mut map = BTreeMap::new();
        if !amount.is_zero() {
            map.insert(denom.into(), amount);
        }
        Self(map)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn amount_of(&self, denom: &str) -> Dec {
        self.0.get(denom).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Dec)> {
        self.0.iter()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.0.keys().try_for_each(|d| validate_denom(d))
    }

    pub fn checked_add(&self, other: &DecCoins) -> Option<DecCoins> {
        let mut map = self.0.clone();
        for (denom, amount) in &other.0 {
            let entry = map.entry(denom.clone()).or_insert_with(Dec::zero);
            *entry = entry.checked_add(*amount)?;
        }
        Some(DecCoins(map))
    }

    pub fn checked_sub(&self, other: &DecCoins) -> Option<DecCoins> {
        let mut map = self.0.clone();
        for (denom, amount) in &other.0 {
            let current = map.get(denom).copied().unwrap_or_default();
            let remaining = current.checked_sub(*amount)?;
            if remaining.is_zero() {
                map.remove(denom);
            } else {
                map.insert(denom.clone(), remaining);
            }
        }
        Some(DecCoins(map))
    }
}

impl TryFrom<Vec<DecCoin>> for DecCoins {
    type Error = String;

    fn try_from(coins: Vec<DecCoin>) -> Result<Self, Self::Error> {
        DecCoins::new(coins)
    }
}

impl From<DecCoins> for Vec<DecCoin> {
    fn from(coins: DecCoins) -> Self {
        coins
            .0
            .into_iter()
            .map(|(denom, amount)| DecCoin { denom, amount })
            .collect()
    }
}
