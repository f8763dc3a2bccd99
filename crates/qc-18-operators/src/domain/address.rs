//! # Addresses
//!
//! 20-byte identities rendered as `0x`-prefixed lowercase hex.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::entities::OperatorId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must start with 0x: {0}")]
    MissingPrefix(String),
    #[error("address must be {expected} hex characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("invalid hex in address: {0}")]
    InvalidHex(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address([u8; Address::LEN]);

impl Address {
    pub const LEN: usize = 20;

    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Deterministic account owned by a named module: `sha256(name)[..20]`.
    pub fn module_address(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        let mut bytes = [0u8; Self::LEN];
        bytes.copy_from_slice(&digest[..Self::LEN]);
        Address(bytes)
    }

    /// Custodial address of the operator's delegation pool.
    pub fn for_operator(id: OperatorId) -> Self {
        Self::module_address(&format!("operator-{}", id))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix("0x")
            .ok_or_else(|| AddressError::MissingPrefix(s.to_string()))?;
        if body.len() != Self::LEN * 2 {
            return Err(AddressError::InvalidLength {
                expected: Self::LEN * 2,
                actual: body.len(),
            });
        }
        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(body, &mut bytes)
            .map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Ok(Address(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_parse_roundtrip() {
        let addr = Address::from_bytes([0xab; 20]);
        let s = addr.to_string();
        assert_eq!(s.len(), 42);
        assert_eq!(s.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            "abab".parse::<Address>(),
            Err(AddressError::MissingPrefix(_))
        ));
        assert!(matches!(
            "0xabab".parse::<Address>(),
            Err(AddressError::InvalidLength { .. })
        ));
        let bad = format!("0x{}", "zz".repeat(20));
        assert!(matches!(bad.parse::<Address>(), Err(AddressError::InvalidHex(_))));
    }

    #[test]
    fn test_operator_address_is_deterministic_and_distinct() {
        assert_eq!(Address::for_operator(1), Address::for_operator(1));
        assert_ne!(Address::for_operator(1), Address::for_operator(2));
    }
}
